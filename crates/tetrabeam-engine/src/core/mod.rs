//! Board, piece geometry, and placement primitives.

pub use self::{bit_board::*, piece::*, placement::*};

pub(crate) mod bit_board;
pub(crate) mod piece;
pub(crate) mod placement;

const PLAYABLE_WIDTH: usize = 10;
const VISIBLE_HEIGHT: usize = 20;
const HIDDEN_HEIGHT: usize = 2;
const BOARD_HEIGHT: usize = HIDDEN_HEIGHT + VISIBLE_HEIGHT;
const SENTINEL_MARGIN_LEFT: usize = 2;
