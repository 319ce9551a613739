//! Board, piece geometry, placement, move generation and headless simulation
//! for the tetrabeam move-selection engine.

pub use self::{core::*, engine::*, movegen::*};

pub mod core;
pub mod engine;
pub mod movegen;

/// A command that could not be executed against a [`GameField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum ActionError {
    #[display("piece collides on {action}")]
    Collision { action: Action },
    #[display("hold already used for this piece")]
    HoldUsed,
    #[display("action sequence ended without a hard drop")]
    MissingHardDrop,
    #[display("game is over")]
    GameOver,
}
