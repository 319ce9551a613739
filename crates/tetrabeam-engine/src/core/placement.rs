use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{
    BOARD_HEIGHT, PLAYABLE_WIDTH,
    bit_board::BitBoard,
    piece::{Piece, PieceKind, PiecePosition, PieceRotation, RotationDirection, Shape},
};

/// A resting position for a piece: kind, rotation and the board cell of the
/// top-left corner of its trimmed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    kind: PieceKind,
    rotation: PieceRotation,
    col: u8,
    row: u8,
}

impl Placement {
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: PieceRotation, col: u8, row: u8) -> Self {
        Self {
            kind,
            rotation,
            col,
            row,
        }
    }

    /// Placement covering the same cells as `piece`, if the piece is on the board.
    #[must_use]
    pub fn from_piece(piece: &Piece) -> Option<Self> {
        Some(Self {
            kind: piece.kind(),
            rotation: piece.rotation(),
            col: u8::try_from(piece.col()).ok()?,
            row: u8::try_from(piece.row()).ok()?,
        })
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub const fn col(&self) -> usize {
        self.col as usize
    }

    #[must_use]
    pub const fn row(&self) -> usize {
        self.row as usize
    }

    #[must_use]
    pub const fn shape(&self) -> &'static Shape {
        self.kind.shape(self.rotation)
    }

    /// Piece whose cells coincide with this placement.
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub const fn piece(&self) -> Piece {
        let shape = self.shape();
        Piece::with_state(
            self.kind,
            self.rotation,
            PiecePosition::new(
                self.col as i8 - shape.offset_x() as i8,
                self.row as i8 - shape.offset_y() as i8,
            ),
        )
    }

    /// Identifies the covered cells; rotation states that produce the same
    /// cells share a signature.
    #[must_use]
    pub const fn signature(&self) -> u32 {
        self.shape().signature() as u32 | (self.col as u32) << 16 | (self.row as u32) << 24
    }

    /// Board cells `(row, col)` covered by the placement.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let (row, col) = (self.row(), self.col());
        self.shape()
            .cells()
            .map(move |(dy, dx)| (row + usize::from(dy), col + usize::from(dx)))
    }
}

/// Checks whether `kind` in `rotation` fits with its trimmed shape's top-left
/// corner at (`col`, `row`).
#[must_use]
pub fn can_place(
    board: &BitBoard,
    kind: PieceKind,
    rotation: PieceRotation,
    col: i32,
    row: i32,
) -> bool {
    let shape = kind.shape(rotation);
    let (Ok(col), Ok(row)) = (usize::try_from(col), usize::try_from(row)) else {
        return false;
    };
    if col + shape.width() > PLAYABLE_WIDTH || row + shape.height() > BOARD_HEIGHT {
        return false;
    }
    can_place_unchecked(board, shape, col, row)
}

/// Resolves the resting row of a hard drop in column `col`.
///
/// The drop starts at the top row, or at the first row below it where the
/// shape fits when the top is obstructed. Returns `None` if no row of the
/// column admits the shape.
#[must_use]
pub fn find_drop_row(
    board: &BitBoard,
    kind: PieceKind,
    rotation: PieceRotation,
    col: usize,
) -> Option<usize> {
    let shape = kind.shape(rotation);
    if col + shape.width() > PLAYABLE_WIDTH {
        return None;
    }
    let start = (0..=BOARD_HEIGHT - shape.height())
        .find(|&row| can_place_unchecked(board, shape, col, row))?;
    Some(fall(board, shape, col, start))
}

/// Columns in which `kind` has at least one valid resting row.
#[must_use]
pub fn find_valid_positions(
    board: &BitBoard,
    kind: PieceKind,
    rotation: PieceRotation,
) -> ArrayVec<usize, PLAYABLE_WIDTH> {
    let width = kind.shape(rotation).width();
    (0..=PLAYABLE_WIDTH - width)
        .filter(|&col| find_drop_row(board, kind, rotation, col).is_some())
        .collect()
}

/// Every hard-drop placement of `kind`, rotation by rotation, left to right.
///
/// Rotation states with identical cells are not merged.
#[expect(clippy::cast_possible_truncation)]
pub fn valid_placements(board: &BitBoard, kind: PieceKind) -> impl Iterator<Item = Placement> + '_ {
    PieceRotation::ALL.into_iter().flat_map(move |rotation| {
        let width = kind.shape(rotation).width();
        (0..=PLAYABLE_WIDTH - width).filter_map(move |col| {
            let row = find_drop_row(board, kind, rotation, col)?;
            Some(Placement::new(kind, rotation, col as u8, row as u8))
        })
    })
}

/// Rotates `piece` with SRS kicks: the unkicked position first, then each
/// offset in order. Returns `None` when every test collides.
#[must_use]
pub fn rotate_with_kicks(
    board: &BitBoard,
    piece: &Piece,
    direction: RotationDirection,
) -> Option<Piece> {
    let rotated = piece.rotated(direction);
    piece
        .kind()
        .kicks(piece.rotation(), direction)
        .iter()
        // kick tables use y-up
        .map(|&(dx, dy)| rotated.shifted(dx, -dy))
        .find(|candidate| !board.is_colliding(candidate))
}

/// Moves `piece` straight down until it rests.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn drop_piece(board: &BitBoard, piece: &Piece) -> Piece {
    let (Ok(col), Ok(row)) = (usize::try_from(piece.col()), usize::try_from(piece.row())) else {
        return *piece;
    };
    if board.is_colliding(piece) {
        return *piece;
    }
    let landed = fall(board, piece.shape(), col, row);
    piece.shifted(0, (landed - row) as i8)
}

impl BitBoard {
    #[must_use]
    pub fn is_colliding(&self, piece: &Piece) -> bool {
        !can_place(self, piece.kind(), piece.rotation(), piece.col(), piece.row())
    }

    /// Marks the cells of `placement` as occupied. Does not clear lines.
    pub fn fill_placement(&mut self, placement: &Placement) {
        debug_assert!(
            placement.row() + placement.shape().height() <= BOARD_HEIGHT
                && placement.col() + placement.shape().width() <= PLAYABLE_WIDTH,
            "placement {placement:?} out of range"
        );
        for (dy, &mask) in placement.shape().rows().iter().enumerate() {
            let row = placement.row() + dy;
            if row < BOARD_HEIGHT {
                self.occupy(row, placement.col(), mask);
            }
        }
    }
}

fn can_place_unchecked(board: &BitBoard, shape: &Shape, col: usize, row: usize) -> bool {
    shape
        .rows()
        .iter()
        .enumerate()
        .all(|(dy, &mask)| !board.overlaps(row + dy, col, mask))
}

/// Resting row for a shape that currently fits at `row`.
///
/// Each shape column is contiguous, so the column stops one row above the
/// first occupied cell under its lowest cell.
fn fall(board: &BitBoard, shape: &Shape, col: usize, row: usize) -> usize {
    let mut rest = BOARD_HEIGHT - shape.height();
    for (dx, &bottom) in shape.column_bottoms().iter().enumerate() {
        let bottom = row + usize::from(bottom);
        let blocker = (bottom + 1..BOARD_HEIGHT)
            .find(|&r| board.row(r).is_cell_occupied(col + dx))
            .unwrap_or(BOARD_HEIGHT);
        rest = rest.min(blocker - 1 - (bottom - row));
    }
    rest.max(row)
}
