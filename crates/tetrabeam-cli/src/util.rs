use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use log::warn;
use tetrabeam_evaluator::{EvaluatorProfile, WeightConfiguration, WeightStore};
use tetrabeam_search::{Engine, SearchConfig};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self)
            .with_context(|| format!("Failed to write newline after JSON to {}", self.display_path()))?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {} JSON file: {}", file_kind, path.display()))?;

    Ok(value)
}

/// Engine selection shared by the commands that run searches.
///
/// Flags override the values read from `--config`.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EngineArg {
    /// Weight configuration JSON file (built-in weights when omitted or invalid)
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Search configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Thinking-time limit per decision in milliseconds
    #[arg(long)]
    thinking_time_ms: Option<u64>,
    /// Candidates kept after every ply
    #[arg(long)]
    beam_width: Option<usize>,
    /// Queue pieces searched past the current piece
    #[arg(long)]
    lookahead_depth: Option<usize>,
    /// Evaluator profile: dellacherie, pattern_augmented or stacking
    #[arg(long)]
    profile: Option<EvaluatorProfile>,
    /// Do not consider the hold piece
    #[arg(long)]
    no_hold: bool,
    /// Disable pattern bonuses
    #[arg(long)]
    no_patterns: bool,
    /// Always use the mid-phase weights
    #[arg(long)]
    no_phase_adaptive: bool,
    /// Disable situational multipliers
    #[arg(long)]
    no_situational: bool,
}

impl EngineArg {
    pub(crate) fn search_config(&self) -> anyhow::Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => read_json_file("search configuration", path)?,
            None => SearchConfig::default(),
        };
        if let Some(ms) = self.thinking_time_ms {
            config.thinking_time = Duration::from_millis(ms);
        }
        if let Some(width) = self.beam_width {
            config.beam_width = width;
        }
        if let Some(depth) = self.lookahead_depth {
            config.lookahead_depth = depth;
        }
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
        config.hold &= !self.no_hold;
        config.patterns &= !self.no_patterns;
        config.phase_adaptive &= !self.no_phase_adaptive;
        config.situational &= !self.no_situational;
        Ok(config)
    }

    /// Loads `--weights`, falling back to the built-in weights with a warning.
    pub(crate) fn weights(&self) -> Arc<WeightConfiguration> {
        let mut store = WeightStore::new();
        let Some(path) = &self.weights else {
            return store.current();
        };
        let outcome = store.load_path(path);
        if let Some(error) = &outcome.error {
            warn!("using {:?} weights instead of {}: {error}", outcome.source, path.display());
        }
        outcome.config
    }

    pub(crate) fn build_engine(&self) -> anyhow::Result<Engine> {
        let config = self.search_config()?;
        Engine::new(config, self.weights()).context("Invalid search configuration")
    }
}
