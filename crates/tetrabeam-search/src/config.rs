use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tetrabeam_evaluator::{EvaluatorOptions, EvaluatorProfile};

/// Largest beam the engine accepts.
pub const MAX_BEAM_WIDTH: usize = 64;
/// Largest number of plies searched past the current piece.
pub const MAX_LOOKAHEAD_DEPTH: usize = 4;

/// Search options.
///
/// In JSON every field is optional; missing ones take their default, and
/// the thinking time is given in whole milliseconds as `thinking_time_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    #[serde(
        rename = "thinking_time_ms",
        serialize_with = "serialize_millis",
        deserialize_with = "deserialize_millis"
    )]
    pub thinking_time: Duration,
    /// Candidates kept after every ply.
    pub beam_width: usize,
    /// Plies expanded after the current piece, using known queue pieces.
    pub lookahead_depth: usize,
    pub hold: bool,
    pub profile: EvaluatorProfile,
    pub patterns: bool,
    pub phase_adaptive: bool,
    pub situational: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            thinking_time: Duration::from_millis(50),
            beam_width: 8,
            lookahead_depth: 1,
            hold: true,
            profile: EvaluatorProfile::PatternAugmented,
            patterns: true,
            phase_adaptive: true,
            situational: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum ConfigError {
    #[display("beam width must be between 1 and {}, got {value}", MAX_BEAM_WIDTH)]
    BeamWidth { value: usize },
    #[display("lookahead depth must be at most {}, got {value}", MAX_LOOKAHEAD_DEPTH)]
    LookaheadDepth { value: usize },
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_BEAM_WIDTH).contains(&self.beam_width) {
            return Err(ConfigError::BeamWidth {
                value: self.beam_width,
            });
        }
        if self.lookahead_depth > MAX_LOOKAHEAD_DEPTH {
            return Err(ConfigError::LookaheadDepth {
                value: self.lookahead_depth,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn evaluator_options(&self) -> EvaluatorOptions {
        EvaluatorOptions {
            profile: self.profile,
            phase_adaptive: self.phase_adaptive,
            situational: self.situational,
            patterns: self.patterns,
        }
    }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    serializer.serialize_u64(millis)
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
