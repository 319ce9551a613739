use clap::{Parser, Subcommand};

use self::{auto_play::AutoPlayArg, decide::DecideArg, weights::WeightsArg};

mod auto_play;
mod decide;
mod weights;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Decide a move for a game state and print the decision as JSON
    Decide(#[clap(flatten)] DecideArg),
    /// Play a headless game, executing every decision's action sequence
    #[command(name = "auto-play")]
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Write or check weight configuration documents
    Weights(#[clap(flatten)] WeightsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Decide(arg) => decide::run(&arg)?,
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::Weights(arg) => weights::run(&arg)?,
    }
    Ok(())
}
