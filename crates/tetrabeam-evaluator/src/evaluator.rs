//! Placement scoring.
//!
//! Scoring is split in two steps so the per-candidate work stays minimal:
//!
//! 1. [`Evaluator::resolve`] runs once per decision. It looks at the root
//!    board and game progress, picks the phase weights, multiplies in every
//!    active situation table and the profile table, and returns a
//!    [`ResolvedWeights`].
//! 2. [`ResolvedWeights::evaluate`] runs once per candidate. It applies the
//!    placement to a copy of the board, extracts the features that carry a
//!    non-zero coefficient and returns `Σ coefficient × value`, plus pattern
//!    bonuses when the profile uses them.
//!
//! Both steps are pure: the same board, placement, preview and weights
//! always produce the same [`Evaluation`].
//!
//! # Profiles
//!
//! - [`EvaluatorProfile::Dellacherie`]: only the six classic features, no patterns
//! - [`EvaluatorProfile::PatternAugmented`]: every feature plus pattern bonuses
//! - [`EvaluatorProfile::Stacking`]: every feature scaled by the document's
//!   `profiles.stacking` table, no patterns

use std::{fmt, str::FromStr, sync::Arc};

use arrayvec::ArrayVec;
use log::trace;
use serde::{Deserialize, Serialize};
use tetrabeam_engine::{BitBoard, ClearedRows, PieceKind, Placement};

use crate::{
    board_analysis::BoardAnalysis,
    feature::{Feature, FeatureVector},
    pattern::{self, PatternMatches},
    placement_analysis::PlacementAnalysis,
    situation::SituationKind,
    weight_config::{PatternBonuses, WeightConfiguration},
    weights::GamePhase,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorProfile {
    Dellacherie,
    #[default]
    PatternAugmented,
    Stacking,
}

impl EvaluatorProfile {
    pub const ALL: [Self; 3] = [Self::Dellacherie, Self::PatternAugmented, Self::Stacking];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dellacherie => "dellacherie",
            Self::PatternAugmented => "pattern_augmented",
            Self::Stacking => "stacking",
        }
    }

    fn uses_patterns(self) -> bool {
        matches!(self, Self::PatternAugmented)
    }
}

impl fmt::Display for EvaluatorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown evaluator profile {text:?} (expected dellacherie, pattern_augmented or stacking)")]
pub struct ProfileParseError {
    text: String,
}

impl FromStr for EvaluatorProfile {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ProfileParseError { text: s.to_owned() })
    }
}

/// Feature toggles selected by the search configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorOptions {
    pub profile: EvaluatorProfile,
    /// Use the phase weights for the current game progress; otherwise always
    /// the mid-phase weights.
    pub phase_adaptive: bool,
    pub situational: bool,
    pub patterns: bool,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            profile: EvaluatorProfile::PatternAugmented,
            phase_adaptive: true,
            situational: true,
            patterns: true,
        }
    }
}

/// Scores placements with an explicitly provided weight configuration.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: Arc<WeightConfiguration>,
    options: EvaluatorOptions,
}

impl Evaluator {
    #[must_use]
    pub fn new(config: Arc<WeightConfiguration>, options: EvaluatorOptions) -> Self {
        Self { config, options }
    }

    #[must_use]
    pub fn config(&self) -> &WeightConfiguration {
        &self.config
    }

    #[must_use]
    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// Effective weights for a decision taken on `board` after `lines` cleared
    /// lines at `level`.
    #[must_use]
    pub fn resolve(&self, board: &BitBoard, lines: u32, level: u32) -> ResolvedWeights {
        let config = &*self.config;
        let phase = if self.options.phase_adaptive {
            config.phase_for(lines, level)
        } else {
            GamePhase::Mid
        };
        let mut coefficients = config.phase_weights(phase).to_vector();

        let mut situations = ArrayVec::new();
        if self.options.situational {
            let analysis = BoardAnalysis::from_board(board);
            for kind in config.situations.active(&analysis) {
                config.situations.get(kind).multipliers.apply(&mut coefficients);
                situations.push(kind);
            }
        }

        match self.options.profile {
            EvaluatorProfile::Dellacherie => {
                for feature in Feature::ALL {
                    if !Feature::DELLACHERIE.contains(&feature) {
                        coefficients.set(feature, 0.0);
                    }
                }
            }
            EvaluatorProfile::Stacking => config.profiles.stacking.apply(&mut coefficients),
            EvaluatorProfile::PatternAugmented => {}
        }

        let patterns = (self.options.patterns && self.options.profile.uses_patterns())
            .then_some(config.patterns);

        trace!(
            "resolved weights: profile {}, phase {phase:?}, situations {situations:?}",
            self.options.profile
        );
        ResolvedWeights {
            phase,
            situations,
            coefficients,
            patterns,
        }
    }
}

/// Coefficients for one decision, ready to score candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedWeights {
    phase: GamePhase,
    situations: ArrayVec<SituationKind, 3>,
    coefficients: FeatureVector,
    patterns: Option<PatternBonuses>,
}

impl ResolvedWeights {
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Situations whose multipliers are folded into [`Self::coefficients`].
    #[must_use]
    pub fn situations(&self) -> &[SituationKind] {
        &self.situations
    }

    #[must_use]
    pub fn coefficients(&self) -> &FeatureVector {
        &self.coefficients
    }

    #[must_use]
    pub fn patterns(&self) -> Option<&PatternBonuses> {
        self.patterns.as_ref()
    }

    /// A copy with one coefficient replaced.
    #[must_use]
    pub fn with_coefficient(mut self, feature: Feature, value: f32) -> Self {
        self.coefficients.set(feature, value);
        self
    }

    /// Scores `placement` on `board`. `preview` holds the pieces that follow.
    #[must_use]
    pub fn evaluate(&self, board: &BitBoard, placement: Placement, preview: &[PieceKind]) -> Evaluation {
        let analysis = PlacementAnalysis::from_board(board, placement);
        let features = FeatureVector::extract(&analysis, |f| self.coefficients[f] != 0.0);
        let mut score = features.dot(&self.coefficients);

        let mut patterns = PatternMatches::new();
        let mut pattern_bonus = 0.0;
        if let Some(bonuses) = &self.patterns {
            patterns = pattern::recognize(&analysis, preview, bonuses);
            pattern_bonus = pattern::pattern_bonus(&patterns, bonuses);
            score += pattern_bonus;
        }

        let cleared = analysis.cleared();
        let perfect_clear = analysis.is_perfect_clear();
        Evaluation {
            score,
            features,
            patterns,
            pattern_bonus,
            cleared,
            perfect_clear,
            board: analysis.into_board(),
        }
    }
}

/// Score of one placement with the values that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: f32,
    /// Values of the features that carry weight; the rest are 0.
    pub features: FeatureVector,
    pub patterns: PatternMatches,
    pub pattern_bonus: f32,
    pub cleared: ClearedRows,
    pub perfect_clear: bool,
    /// The board after the placement and its line clears.
    #[serde(skip)]
    pub board: BitBoard,
}
