//! Headless game simulation.
//!
//! - [`GameState`] - Snapshot handed to the decision engine
//! - [`GameField`] - Executes action sequences: moves, rotations, hold, hard drop
//! - [`GameStats`] - Score, lines, level
//! - [`PieceBuffer`] - 7-bag piece generation
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Example
//!
//! ```
//! use tetrabeam_engine::{GameField, PieceSeed, generate_moves};
//!
//! let mut field = GameField::with_seed(PieceSeed::from_u128(1));
//! let mut moves = Vec::new();
//! generate_moves(field.board(), &field.falling_piece(), false, &mut moves);
//!
//! let outcome = field.play(moves[0].actions()).unwrap();
//! assert!(!outcome.top_out());
//! ```

pub use self::{game_field::*, game_state::*, game_stats::*, piece_buffer::*};

mod game_field;
mod game_state;
mod game_stats;
mod piece_buffer;
