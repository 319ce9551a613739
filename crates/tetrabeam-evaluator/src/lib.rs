//! Heuristic evaluation of tetrabeam placements.
//!
//! This crate turns a board and a candidate [`Placement`](tetrabeam_engine::Placement)
//! into a score:
//!
//! - [`board_analysis`] and [`placement_analysis`] compute board metrics lazily
//! - [`feature`] names the evaluation features and extracts their values
//! - [`weights`], [`situation`] and [`weight_config`] describe the versioned
//!   weight document; [`store`] loads it with fallback
//! - [`pattern`] recognizes named stacking setups
//! - [`evaluator`] resolves the weights for a decision and scores candidates

pub use self::{
    error::{ValidationIssue, WeightConfigError},
    evaluator::{Evaluation, Evaluator, EvaluatorOptions, EvaluatorProfile, ProfileParseError, ResolvedWeights},
    feature::{Feature, FeatureVector},
    pattern::{PatternKind, PatternMatch},
    situation::SituationKind,
    store::{LoadOutcome, WeightSource, WeightStore},
    weight_config::{CURRENT_SCHEMA_VERSION, WeightConfiguration},
    weights::{EvaluationWeights, GamePhase},
};

pub mod board_analysis;
pub mod error;
pub mod evaluator;
pub mod feature;
pub mod pattern;
pub mod placement_analysis;
pub mod situation;
pub mod store;
pub mod weight_config;
pub mod weights;
