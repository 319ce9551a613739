use rand::Rng as _;

use super::{GameStats, PieceBuffer, PieceSeed};
use crate::{
    Action, ActionError, BitBoard, ClearedRows, GameState, Piece, PieceKind, Placement,
    drop_piece, rotate_with_kicks,
};

/// What happened when a piece locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOutcome {
    placement: Placement,
    cleared: ClearedRows,
    perfect_clear: bool,
    top_out: bool,
}

impl LockOutcome {
    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    #[must_use]
    pub fn cleared(&self) -> ClearedRows {
        self.cleared
    }

    #[must_use]
    pub fn perfect_clear(&self) -> bool {
        self.perfect_clear
    }

    /// The next piece could not spawn; the game is over.
    #[must_use]
    pub fn top_out(&self) -> bool {
        self.top_out
    }
}

/// Headless single-player game driven by [`Action`]s.
///
/// This is the execution side of a decision: a controller feeds it the action
/// sequence of the chosen move, one command at a time, exactly as it would
/// press keys. There is no gravity; pieces only move on command.
#[derive(Debug, Clone)]
pub struct GameField {
    board: BitBoard,
    falling: Piece,
    held: Option<PieceKind>,
    hold_used: bool,
    buffer: PieceBuffer,
    stats: GameStats,
    game_over: bool,
}

impl Default for GameField {
    fn default() -> Self {
        Self::new()
    }
}

impl GameField {
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut buffer = PieceBuffer::with_seed(seed);
        let falling = Piece::new(buffer.pop_next());
        Self {
            board: BitBoard::EMPTY,
            falling,
            held: None,
            hold_used: false,
            buffer,
            stats: GameStats::new(),
            game_over: false,
        }
    }

    /// Resumes from a snapshot. The snapshot's queue is dealt first, then the
    /// seeded 7-bag takes over. Statistics start from zero.
    #[must_use]
    pub fn from_state(state: &GameState, seed: PieceSeed) -> Self {
        let game_over = state.board.is_colliding(&state.current);
        Self {
            board: state.board.clone(),
            falling: state.current,
            held: state.held,
            hold_used: !state.can_hold,
            buffer: PieceBuffer::with_queue(seed, state.queue.iter().copied()),
            stats: GameStats::new(),
            game_over,
        }
    }

    #[must_use]
    pub fn board(&self) -> &BitBoard {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.falling
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held
    }

    #[must_use]
    pub fn can_hold(&self) -> bool {
        !self.hold_used
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.buffer.next_pieces()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Captures the state a decision engine sees, with `preview` queued pieces.
    #[must_use]
    pub fn snapshot(&self, preview: usize) -> GameState {
        GameState {
            board: self.board.clone(),
            current: self.falling,
            queue: self.buffer.next_pieces().take(preview).collect(),
            held: self.held,
            can_hold: !self.hold_used,
            score: self.stats.score(),
            level: self.stats.level(),
            lines: self.stats.lines(),
        }
    }

    /// Executes one command. Returns the lock outcome on `HardDrop`.
    ///
    /// A rejected command leaves the field unchanged.
    pub fn apply(&mut self, action: Action) -> Result<Option<LockOutcome>, ActionError> {
        if self.game_over {
            return Err(ActionError::GameOver);
        }
        match action {
            Action::MoveLeft | Action::MoveRight => {
                let dx = action.shift().unwrap_or(0);
                let moved = self.falling.shifted(dx, 0);
                if self.board.is_colliding(&moved) {
                    return Err(ActionError::Collision { action });
                }
                self.falling = moved;
            }
            Action::RotateClockwise | Action::RotateCounterclockwise | Action::Rotate180 => {
                let rotated = action
                    .rotation_direction()
                    .and_then(|direction| rotate_with_kicks(&self.board, &self.falling, direction))
                    .ok_or(ActionError::Collision { action })?;
                self.falling = rotated;
            }
            Action::Hold => self.hold()?,
            Action::HardDrop => return self.lock().map(Some),
        }
        Ok(None)
    }

    /// Executes a complete move: commands up to and including its `HardDrop`.
    pub fn play(&mut self, actions: &[Action]) -> Result<LockOutcome, ActionError> {
        for &action in actions {
            if let Some(outcome) = self.apply(action)? {
                return Ok(outcome);
            }
        }
        Err(ActionError::MissingHardDrop)
    }

    fn hold(&mut self) -> Result<(), ActionError> {
        if self.hold_used {
            return Err(ActionError::HoldUsed);
        }
        let incoming = match self.held {
            Some(kind) => kind,
            None => self
                .buffer
                .next_pieces()
                .next()
                .ok_or(ActionError::Collision {
                    action: Action::Hold,
                })?,
        };
        let spawned = Piece::new(incoming);
        if self.board.is_colliding(&spawned) {
            return Err(ActionError::Collision {
                action: Action::Hold,
            });
        }
        if self.held.replace(self.falling.kind()).is_none() {
            self.buffer.pop_next();
        }
        self.falling = spawned;
        self.hold_used = true;
        Ok(())
    }

    fn lock(&mut self) -> Result<LockOutcome, ActionError> {
        let landed = drop_piece(&self.board, &self.falling);
        let placement = Placement::from_piece(&landed).ok_or(ActionError::Collision {
            action: Action::HardDrop,
        })?;
        self.board.fill_placement(&placement);
        let cleared = self.board.clear_lines();
        let perfect_clear = !cleared.is_empty() && self.board.is_empty();
        self.stats.record_lock(cleared.len(), perfect_clear);

        self.falling = Piece::new(self.buffer.pop_next());
        self.hold_used = false;
        self.game_over = self.board.is_colliding(&self.falling);

        Ok(LockOutcome {
            placement,
            cleared,
            perfect_clear,
            top_out: self.game_over,
        })
    }
}
