//! Time-bounded, hold-aware beam search choosing where to place the current
//! piece.
//!
//! An [`Engine`] turns a [`GameState`](tetrabeam_engine::GameState) into a
//! [`Decision`]: the best action sequence, every root candidate with its
//! score, and bookkeeping about the search itself. [`SearchWorker`] runs an
//! engine on a background thread.

pub use self::{
    cancel::CancelToken,
    config::{ConfigError, MAX_BEAM_WIDTH, MAX_LOOKAHEAD_DEPTH, SearchConfig},
    decision::{Decision, Move, SearchOutcome},
    engine::{Engine, EngineState, TOP_OUT_PENALTY},
    worker::{SearchResponse, SearchWorker},
};

mod arena;
pub mod cancel;
pub mod config;
pub mod decision;
pub mod engine;
pub mod worker;
