//! Analysis of the board after a piece locks.
//!
//! [`PlacementAnalysis`] applies a placement to a copy of the board, clears the
//! completed rows and wraps the result in a [`BoardAnalysis`]. Features read
//! the placement-specific values (landing height, cleared rows) from here and
//! everything else from the board analysis.

use tetrabeam_engine::{BitBoard, ClearedRows, Placement};

use crate::board_analysis::BoardAnalysis;

#[derive(Debug)]
pub struct PlacementAnalysis {
    placement: Placement,
    cleared: ClearedRows,
    board_analysis: BoardAnalysis,
}

impl PlacementAnalysis {
    #[must_use]
    pub fn from_board(before_placement: &BitBoard, placement: Placement) -> Self {
        let mut board = before_placement.clone();
        board.fill_placement(&placement);
        let cleared = board.clear_lines();

        Self {
            placement,
            cleared,
            board_analysis: BoardAnalysis::new(board),
        }
    }

    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Row indices (before compaction) removed by this placement.
    #[must_use]
    pub fn cleared(&self) -> ClearedRows {
        self.cleared
    }

    #[must_use]
    pub fn cleared_lines(&self) -> usize {
        self.cleared.len()
    }

    /// The placement cleared at least one row and left nothing behind.
    #[must_use]
    pub fn is_perfect_clear(&self) -> bool {
        !self.cleared.is_empty() && self.board_analysis.board().is_empty()
    }

    /// Height of the middle of the piece above the floor, before clearing.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn landing_height(&self) -> f32 {
        let height = self.placement.shape().height();
        let below = BitBoard::HEIGHT - (self.placement.row() + height);
        below as f32 + (height - 1) as f32 / 2.0
    }

    #[must_use]
    pub fn board_analysis(&self) -> &BoardAnalysis {
        &self.board_analysis
    }

    #[must_use]
    pub fn into_board(self) -> BitBoard {
        self.board_analysis.into_board()
    }
}

#[cfg(test)]
mod tests {
    use tetrabeam_engine::{PieceKind, PieceRotation, find_drop_row};

    use super::*;

    fn drop(board: &BitBoard, kind: PieceKind, rotation: u8, col: usize) -> Placement {
        let rotation = PieceRotation::new(rotation).unwrap();
        let row = find_drop_row(board, kind, rotation, col).unwrap();
        Placement::new(kind, rotation, col.try_into().unwrap(), row.try_into().unwrap())
    }

    #[test]
    fn test_landing_height_on_empty_board() {
        let board = BitBoard::EMPTY;
        let flat = PlacementAnalysis::from_board(&board, drop(&board, PieceKind::I, 0, 0));
        assert!((flat.landing_height() - 0.0).abs() < f32::EPSILON);
        let upright = PlacementAnalysis::from_board(&board, drop(&board, PieceKind::I, 1, 0));
        assert!((upright.landing_height() - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clear_is_reported() {
        let board = BitBoard::from_ascii("#########.");
        let analysis = PlacementAnalysis::from_board(&board, drop(&board, PieceKind::I, 1, 9));
        assert_eq!(analysis.cleared_lines(), 1);
        assert!(analysis.cleared().contains(21));
        assert!(!analysis.is_perfect_clear());
        assert_eq!(analysis.board_analysis().column_heights()[9], 3);
        assert!(!board.is_empty(), "input board is left untouched");
    }

    #[test]
    fn test_perfect_clear() {
        let board = BitBoard::from_ascii(
            "
            ######....
            ######....
            ",
        );
        let analysis = PlacementAnalysis::from_board(&board, drop(&board, PieceKind::O, 0, 6));
        assert_eq!(analysis.cleared_lines(), 0);

        let board = BitBoard::from_ascii(
            "
            ########..
            ########..
            ",
        );
        let analysis = PlacementAnalysis::from_board(&board, drop(&board, PieceKind::O, 0, 8));
        assert_eq!(analysis.cleared_lines(), 2);
        assert!(analysis.is_perfect_clear());
        assert!(analysis.into_board().is_empty());
    }
}
