//! Recognition of named stacking setups.
//!
//! Detection is signature matching on the metrics [`BoardAnalysis`] already
//! computes for the base features (column heights, holes, T slots), so it
//! adds a handful of comparisons per candidate rather than another pass over
//! the board.
//!
//! | pattern | signature |
//! |---|---|
//! | Perfect-Clear-Opener | stack at most 4 high, no holes, bottom four rows short by a multiple of 4 cells |
//! | DT cannon | a one-sided T twist slot in a 4..=12 high stack with at most 2 holes |
//! | ST stack | every column but one inside a 2-high band, the last one at least 2 below it |
//! | Perfect clear | the placement cleared rows and emptied the board |
//!
//! Setups that wait for a specific piece (I for the opener, T for the
//! cannon) are scaled by [`PatternBonuses::queue_support_factor`] when that
//! piece is in the preview.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use tetrabeam_engine::{BitBoard, PieceKind};

use crate::{placement_analysis::PlacementAnalysis, weight_config::PatternBonuses};

/// Rows at the bottom of the board a perfect clear opener fills.
const PCO_ROWS: usize = 4;
const PCO_CELLS: u32 = (PCO_ROWS * BitBoard::WIDTH) as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    PerfectClearOpener,
    DtCannon,
    StStack,
    PerfectClear,
}

impl PatternKind {
    #[must_use]
    pub fn bonus(self, bonuses: &PatternBonuses) -> f32 {
        match self {
            Self::PerfectClearOpener => bonuses.perfect_clear_opener,
            Self::DtCannon => bonuses.dt_cannon,
            Self::StStack => bonuses.st_stack,
            Self::PerfectClear => bonuses.perfect_clear,
        }
    }
}

/// A recognized pattern and how strongly the board expresses it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub kind: PatternKind,
    pub strength: f32,
}

pub type PatternMatches = ArrayVec<PatternMatch, 4>;

/// Every pattern the board after `analysis` matches.
///
/// `preview` holds the pieces that follow the one just placed.
#[must_use]
pub fn recognize(
    analysis: &PlacementAnalysis,
    preview: &[PieceKind],
    bonuses: &PatternBonuses,
) -> PatternMatches {
    let mut matches = PatternMatches::new();
    let queue_boost = |kind: PieceKind| {
        if preview.contains(&kind) {
            bonuses.queue_support_factor
        } else {
            1.0
        }
    };

    if analysis.is_perfect_clear() {
        matches.push(PatternMatch {
            kind: PatternKind::PerfectClear,
            strength: 1.0,
        });
        return matches;
    }

    if let Some(strength) = perfect_clear_opener(analysis) {
        matches.push(PatternMatch {
            kind: PatternKind::PerfectClearOpener,
            strength: strength * queue_boost(PieceKind::I),
        });
    }
    if dt_cannon(analysis) {
        matches.push(PatternMatch {
            kind: PatternKind::DtCannon,
            strength: queue_boost(PieceKind::T),
        });
    }
    if let Some(strength) = st_stack(analysis) {
        matches.push(PatternMatch {
            kind: PatternKind::StStack,
            strength,
        });
    }
    matches
}

/// `Σ bonus(kind) × strength` over `matches`.
#[must_use]
pub fn pattern_bonus(matches: &[PatternMatch], bonuses: &PatternBonuses) -> f32 {
    matches.iter().map(|m| m.kind.bonus(bonuses) * m.strength).sum()
}

#[expect(clippy::cast_precision_loss)]
fn perfect_clear_opener(analysis: &PlacementAnalysis) -> Option<f32> {
    let board = analysis.board_analysis();
    if usize::from(board.max_height()) > PCO_ROWS || board.holes() > 0 || board.board().is_empty() {
        return None;
    }
    let filled: u32 = board
        .board()
        .rows()
        .skip(BitBoard::HEIGHT - PCO_ROWS)
        .map(|row| row.count_occupied())
        .sum();
    ((PCO_CELLS - filled) % 4 == 0).then(|| filled as f32 / PCO_CELLS as f32)
}

fn dt_cannon(analysis: &PlacementAnalysis) -> bool {
    let board = analysis.board_analysis();
    board.twist_slots() > 0 && (4..=12).contains(&board.max_height()) && board.holes() <= 2
}

fn st_stack(analysis: &PlacementAnalysis) -> Option<f32> {
    let board = analysis.board_analysis();
    if board.holes() > 0 || board.max_height() < 2 {
        return None;
    }
    let heights = board.column_heights();
    let (well, &well_height) = heights.iter().enumerate().min_by_key(|(_, h)| **h)?;
    let others = heights
        .iter()
        .enumerate()
        .filter(|(x, _)| *x != well)
        .map(|(_, h)| *h);
    let band_min = others.clone().min()?;
    let band_max = others.max()?;
    let band = band_max - band_min;
    if band > 2 || well_height + 2 > band_min {
        return None;
    }
    Some(1.0 - f32::from(band) / 4.0)
}

#[cfg(test)]
mod tests {
    use tetrabeam_engine::{PieceRotation, Placement, find_drop_row};

    use super::*;
    use crate::weight_config::WeightConfiguration;

    fn bonuses() -> PatternBonuses {
        WeightConfiguration::builtin().patterns
    }

    fn place(board: &BitBoard, kind: PieceKind, rotation: u8, col: usize) -> PlacementAnalysis {
        let rotation = PieceRotation::new(rotation).unwrap();
        let row = find_drop_row(board, kind, rotation, col).unwrap();
        let placement = Placement::new(kind, rotation, col.try_into().unwrap(), row.try_into().unwrap());
        PlacementAnalysis::from_board(board, placement)
    }

    fn kinds(matches: &PatternMatches) -> Vec<PatternKind> {
        matches.iter().map(|m| m.kind).collect()
    }

    #[test]
    fn test_perfect_clear() {
        let board = BitBoard::from_ascii(
            "
            ########..
            ########..
            ",
        );
        let analysis = place(&board, PieceKind::O, 0, 8);
        let matches = recognize(&analysis, &[], &bonuses());
        assert_eq!(kinds(&matches), [PatternKind::PerfectClear]);
        assert!((pattern_bonus(&matches, &bonuses()) - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_perfect_clear_opener_with_queue_support() {
        // after the O lands: 12 cells, 28 empty
        let board = BitBoard::from_ascii(
            "
            ##........
            ######....
            ",
        );
        let analysis = place(&board, PieceKind::O, 0, 6);
        let without = recognize(&analysis, &[PieceKind::S], &bonuses());
        assert_eq!(kinds(&without), [PatternKind::PerfectClearOpener]);
        assert!((without[0].strength - 12.0 / 40.0).abs() < 1e-6);

        let with = recognize(&analysis, &[PieceKind::S, PieceKind::I], &bonuses());
        assert!((with[0].strength - 12.0 / 40.0 * 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_perfect_clear_opener_needs_piece_multiple() {
        let board = BitBoard::from_ascii("###.......");
        let analysis = place(&board, PieceKind::O, 0, 8);
        // 7 cells: 33 empty cells cannot be filled by whole pieces
        assert!(!kinds(&recognize(&analysis, &[], &bonuses())).contains(&PatternKind::PerfectClearOpener));
    }

    #[test]
    fn test_dt_cannon_slot() {
        let board = BitBoard::from_ascii(
            "
            ..........
            ...#......
            ##.#......
            ##.##.####
            ####.#####
            ####.#####
            ",
        );
        let analysis = place(&board, PieceKind::I, 1, 9);
        let matches = recognize(&analysis, &[PieceKind::T], &bonuses());
        let dt = matches.iter().find(|m| m.kind == PatternKind::DtCannon).unwrap();
        assert!((dt.strength - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_st_stack_band() {
        let board = BitBoard::from_ascii(
            "
            ...###....
            ##.#######
            ##.#######
            ",
        );
        let analysis = place(&board, PieceKind::O, 0, 0);
        // heights 4 4 0 3 3 3 2 2 2 2: a 2-wide band over an empty column
        let matches = recognize(&analysis, &[], &bonuses());
        let st = matches.iter().find(|m| m.kind == PatternKind::StStack).unwrap();
        assert!((st.strength - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_no_patterns_with_holes() {
        let board = BitBoard::from_ascii(
            "
            ###.......
            #.#.......
            ###.......
            ",
        );
        let analysis = place(&board, PieceKind::O, 0, 8);
        assert!(recognize(&analysis, &[PieceKind::T, PieceKind::I], &bonuses()).is_empty());
    }
}
