use std::path::{Path, PathBuf};

use clap::Subcommand;
use tetrabeam_evaluator::WeightConfiguration;

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct WeightsArg {
    #[command(subcommand)]
    command: WeightsCommand,
}

#[derive(Debug, Clone, Subcommand)]
enum WeightsCommand {
    /// Write the built-in weight configuration
    Default {
        /// Output file path (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check a weight configuration file and list every problem found
    Validate {
        /// Weight configuration JSON file
        file: PathBuf,
    },
}

pub(crate) fn run(arg: &WeightsArg) -> anyhow::Result<()> {
    match &arg.command {
        WeightsCommand::Default { output } => {
            Output::save_json(&WeightConfiguration::builtin(), output.clone())
        }
        WeightsCommand::Validate { file } => validate(file),
    }
}

fn validate(file: &Path) -> anyhow::Result<()> {
    match WeightConfiguration::from_path(file) {
        Ok(config) => {
            println!(
                "{}: ok ({:?}, schema version {}, created {})",
                file.display(),
                config.name,
                config.schema_version,
                config.created_at.to_rfc3339()
            );
            Ok(())
        }
        Err(error) => {
            println!("{}: {error}", file.display());
            for issue in error.issues() {
                println!("  {issue}");
            }
            anyhow::bail!("{} is not a valid weight configuration", file.display())
        }
    }
}
