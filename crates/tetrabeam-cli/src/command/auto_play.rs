use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use rand::Rng as _;
use serde::Serialize;
use tetrabeam_engine::{GameField, GameStats, PieceSeed};

use crate::util::{EngineArg, Output};

const PROGRESS_INTERVAL: u64 = 100;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Stop after this many pieces
    #[arg(long, default_value_t = 1000)]
    pieces: u64,
    /// Piece sequence seed, 32 hex digits (random when omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Queue pieces visible to the engine
    #[arg(long, default_value_t = 5)]
    preview: usize,
    /// Output file path for the final statistics (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    engine: EngineArg,
}

#[derive(Debug, Serialize)]
struct AutoPlayReport {
    seed: PieceSeed,
    game_over: bool,
    stats: GameStats,
    decisions: u64,
    timed_out: u64,
    evaluations: u64,
    mean_thinking_ms: f64,
    max_thinking_ms: f64,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut engine = arg.engine.build_engine()?;
    let mut field = GameField::with_seed(seed);
    eprintln!("Playing {} pieces with seed {seed}", arg.pieces);

    let mut decisions = 0;
    let mut timed_out = 0;
    let mut evaluations = 0;
    let mut thinking = Duration::ZERO;
    let mut max_thinking = Duration::ZERO;

    while field.stats().pieces() < arg.pieces && !field.is_game_over() {
        let decision = engine.decide(&field.snapshot(arg.preview));
        decisions += 1;
        timed_out += u64::from(decision.timed_out);
        evaluations += decision.evaluations;
        thinking += decision.elapsed;
        max_thinking = max_thinking.max(decision.elapsed);

        // the next piece is blocked where it spawns
        let Some(best) = decision.best_move else {
            break;
        };
        field
            .play(best.actions())
            .with_context(|| format!("Engine move {:?} was rejected", best.placement()))?;

        let pieces = field.stats().pieces();
        if pieces % PROGRESS_INTERVAL == 0 {
            eprintln!(
                "{pieces} pieces, {} lines, score {}",
                field.stats().lines(),
                field.stats().score()
            );
        }
    }

    #[expect(clippy::cast_precision_loss)]
    let mean_thinking_ms = if decisions == 0 {
        0.0
    } else {
        thinking.as_secs_f64() * 1000.0 / decisions as f64
    };
    let report = AutoPlayReport {
        seed,
        game_over: field.is_game_over(),
        stats: field.stats().clone(),
        decisions,
        timed_out,
        evaluations,
        mean_thinking_ms,
        max_thinking_ms: max_thinking.as_secs_f64() * 1000.0,
    };
    Output::save_json(&report, arg.output.clone())
}
