//! Move generation: turning placements into controller action sequences.
//!
//! - [`Action`] - One discrete input command
//! - [`GeneratedMove`] - A reachable placement plus the actions that produce it
//! - [`generate_moves`] - Enumerates every distinct reachable hard-drop placement

pub use self::{action::*, move_generator::*};

mod action;
mod move_generator;
