use std::path::PathBuf;

use tetrabeam_engine::GameState;

use crate::util::{EngineArg, Output, read_json_file};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DecideArg {
    /// Game state JSON file
    #[arg(long)]
    state: PathBuf,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    engine: EngineArg,
}

pub(crate) fn run(arg: &DecideArg) -> anyhow::Result<()> {
    let game: GameState = read_json_file("game state", &arg.state)?;
    let mut engine = arg.engine.build_engine()?;
    let decision = engine.decide(&game);
    Output::save_json(&decision, arg.output.clone())
}
