use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::Action;
use crate::{BitBoard, Piece, Placement, drop_piece, rotate_with_kicks, valid_placements};

/// Upper bound on the length of one action sequence
/// (hold + rotation + 9 lateral moves + hard drop fits with room to spare).
pub const MAX_ACTIONS: usize = 16;

pub type ActionSequence = ArrayVec<Action, MAX_ACTIONS>;

/// Upper bound on hard-drop placements of one piece kind on an empty board.
const MAX_PLACEMENTS: usize = 40;

/// A placement reachable from the start piece, with the commands that reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMove {
    placement: Placement,
    actions: ActionSequence,
    use_hold: bool,
}

impl GeneratedMove {
    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Ordered commands: optional `Hold`, rotation, lateral moves, `HardDrop`.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub fn use_hold(&self) -> bool {
        self.use_hold
    }
}

/// Appends every distinct placement reachable by `start` to `out`.
///
/// `start` is the piece as it will be controlled: when `use_hold` is set it is
/// the piece that comes out of the hold swap, and every sequence is prefixed
/// with [`Action::Hold`].
///
/// Placements covering the same cells are generated once; the first rotation
/// state enumerated wins. A placement is only kept if its action sequence,
/// replayed from `start`, actually lands there. Returns the number of moves
/// appended; zero means `start` is blocked where it spawns.
pub fn generate_moves(
    board: &BitBoard,
    start: &Piece,
    use_hold: bool,
    out: &mut Vec<GeneratedMove>,
) -> usize {
    if board.is_colliding(start) {
        return 0;
    }

    let before = out.len();
    let mut seen = ArrayVec::<u32, MAX_PLACEMENTS>::new();
    for placement in valid_placements(board, start.kind()) {
        let signature = placement.signature();
        if seen.contains(&signature) {
            continue;
        }
        let Some(actions) = plan_actions(board, start, &placement, use_hold) else {
            continue;
        };
        seen.push(signature);
        out.push(GeneratedMove {
            placement,
            actions,
            use_hold,
        });
    }
    out.len() - before
}

fn plan_actions(
    board: &BitBoard,
    start: &Piece,
    placement: &Placement,
    use_hold: bool,
) -> Option<ActionSequence> {
    let mut actions = ActionSequence::new();
    if use_hold {
        actions.push(Action::Hold);
    }

    let mut piece = *start;
    if let Some(direction) = piece.rotation().direction_to(placement.rotation()) {
        piece = rotate_with_kicks(board, &piece, direction)?;
        actions.push(Action::rotate(direction));
    }

    let target = i32::try_from(placement.col()).ok()?;
    while piece.col() != target {
        let step = if piece.col() < target {
            Action::MoveRight
        } else {
            Action::MoveLeft
        };
        let moved = piece.shifted(step.shift()?, 0);
        if board.is_colliding(&moved) {
            return None;
        }
        piece = moved;
        actions.try_push(step).ok()?;
    }

    let landed = drop_piece(board, &piece);
    if Placement::from_piece(&landed)? != *placement {
        return None;
    }
    actions.try_push(Action::HardDrop).ok()?;
    Some(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PieceKind, PieceRotation, RotationDirection};

    fn moves_for(board: &BitBoard, kind: PieceKind) -> Vec<GeneratedMove> {
        let mut out = Vec::new();
        generate_moves(board, &Piece::new(kind), false, &mut out);
        out
    }

    // Executes lateral moves, rotations and the hard drop the way a
    // controller would.
    fn replay(board: &BitBoard, start: Piece, actions: &[Action]) -> Option<Placement> {
        let mut piece = start;
        for &action in actions {
            match action {
                Action::Hold => {}
                Action::HardDrop => return Placement::from_piece(&drop_piece(board, &piece)),
                _ => {
                    if let Some(direction) = action.rotation_direction() {
                        piece = rotate_with_kicks(board, &piece, direction)?;
                    } else {
                        let moved = piece.shifted(action.shift()?, 0);
                        if board.is_colliding(&moved) {
                            return None;
                        }
                        piece = moved;
                    }
                }
            }
        }
        None
    }

    #[test]
    fn test_empty_board_move_counts() {
        let board = BitBoard::EMPTY;
        let counts = PieceKind::ALL.map(|kind| moves_for(&board, kind).len());
        // I, O, S, Z, J, L, T
        assert_eq!(counts, [17, 9, 17, 17, 34, 34, 34]);
    }

    #[test]
    fn test_sequences_replay_to_their_placement() {
        let board = BitBoard::from_ascii(
            "
            ......#...
            ##...###..
            ###.####.#
            ",
        );
        for kind in PieceKind::ALL {
            let moves = moves_for(&board, kind);
            assert!(!moves.is_empty());
            for mv in &moves {
                let actions = mv.actions();
                assert_eq!(actions.last(), Some(&Action::HardDrop));
                assert_eq!(
                    replay(&board, Piece::new(kind), actions),
                    Some(*mv.placement()),
                    "{kind} {actions:?}"
                );
            }
        }
    }

    #[test]
    fn test_no_duplicate_cells() {
        let board = BitBoard::EMPTY;
        for kind in PieceKind::ALL {
            let moves = moves_for(&board, kind);
            let mut signatures: Vec<_> = moves.iter().map(|m| m.placement().signature()).collect();
            signatures.sort_unstable();
            signatures.dedup();
            assert_eq!(signatures.len(), moves.len(), "{kind}");
        }
    }

    #[test]
    fn test_first_rotation_state_wins() {
        let board = BitBoard::EMPTY;
        for kind in [PieceKind::I, PieceKind::S, PieceKind::Z] {
            assert!(
                moves_for(&board, kind)
                    .iter()
                    .all(|m| m.placement().rotation().as_u8() < 2)
            );
        }
        assert!(
            moves_for(&board, PieceKind::O)
                .iter()
                .all(|m| m.placement().rotation() == PieceRotation::SPAWN)
        );
    }

    #[test]
    fn test_vertical_i_into_right_well() {
        let board = BitBoard::from_ascii("#########.");
        let moves = moves_for(&board, PieceKind::I);
        let mv = moves
            .iter()
            .find(|m| m.placement().col() == 9 && m.placement().shape().height() == 4)
            .unwrap();
        assert_eq!(
            mv.actions(),
            &[
                Action::RotateClockwise,
                Action::MoveRight,
                Action::MoveRight,
                Action::MoveRight,
                Action::MoveRight,
                Action::HardDrop,
            ]
        );
        assert_eq!(mv.placement().row(), 18);
    }

    #[test]
    fn test_half_turn_uses_single_command() {
        let board = BitBoard::EMPTY;
        let mv = moves_for(&board, PieceKind::T)
            .into_iter()
            .find(|m| m.placement().rotation().as_u8() == 2)
            .unwrap();
        assert_eq!(mv.actions()[0], Action::rotate(RotationDirection::Half));
    }

    #[test]
    fn test_hold_prefix() {
        let board = BitBoard::EMPTY;
        let mut out = Vec::new();
        let added = generate_moves(&board, &Piece::new(PieceKind::L), true, &mut out);
        assert_eq!(added, 34);
        assert!(out.iter().all(|m| m.use_hold() && m.actions()[0] == Action::Hold));
    }

    #[test]
    fn test_unreachable_placements_are_dropped() {
        let mut board = BitBoard::EMPTY;
        for row in 1..BitBoard::HEIGHT {
            board.set_cell(row, 8);
        }
        // column 9 is open but the tower in column 8 blocks every path to it
        assert!(
            valid_placements(&board, PieceKind::I).any(|p| p.col() == 9),
            "the drop itself is legal"
        );
        let moves = moves_for(&board, PieceKind::I);
        assert!(!moves.is_empty());
        assert!(
            moves
                .iter()
                .all(|m| m.placement().col() + m.placement().shape().width() <= 8)
        );
    }

    #[test]
    fn test_blocked_spawn_generates_nothing() {
        let mut board = BitBoard::EMPTY;
        board.set_row_bits(0, 0b00_0111_1000);
        board.set_row_bits(1, 0b00_0111_1000);
        let mut out = Vec::new();
        for kind in PieceKind::ALL {
            assert_eq!(generate_moves(&board, &Piece::new(kind), false, &mut out), 0);
        }
        assert!(out.is_empty());
    }
}
