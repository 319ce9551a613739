use serde::{Deserialize, Deserializer, Serialize};

use crate::{BitBoard, Piece, PieceKind};

/// Snapshot of a game at a piece-placement opportunity.
///
/// This is the value handed to the decision engine: it is self-contained and
/// owns its board, so it can be sent to another thread or written to disk.
///
/// In JSON, `current` accepts either a full piece (`"T#0@3,0"`) or just a
/// kind (`"T"`, spawned at the spawn position); `board` accepts either the
/// hex row format or an array of `#`/`.` rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: BitBoard,
    #[serde(deserialize_with = "deserialize_current")]
    pub current: Piece,
    /// Upcoming pieces, soonest first.
    #[serde(default)]
    pub queue: Vec<PieceKind>,
    #[serde(default)]
    pub held: Option<PieceKind>,
    /// Whether hold may still be used before the current piece locks.
    #[serde(default = "default_can_hold")]
    pub can_hold: bool,
    #[serde(default)]
    pub score: u64,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub lines: u32,
}

fn default_can_hold() -> bool {
    true
}

fn deserialize_current<'de, D>(deserializer: D) -> Result<Piece, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => PieceKind::from_char(c)
            .map(Piece::new)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown piece kind {c:?}"))),
        _ => s.parse().map_err(serde::de::Error::custom),
    }
}

impl GameState {
    /// A fresh state: `current` at its spawn position, nothing queued or held.
    #[must_use]
    pub fn new(board: BitBoard, current: PieceKind) -> Self {
        Self {
            board,
            current: Piece::new(current),
            queue: Vec::new(),
            held: None,
            can_hold: true,
            score: 0,
            level: 0,
            lines: 0,
        }
    }

    #[must_use]
    pub fn with_queue<I>(mut self, queue: I) -> Self
    where
        I: IntoIterator<Item = PieceKind>,
    {
        self.queue = queue.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_held(mut self, held: Option<PieceKind>) -> Self {
        self.held = held;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, lines: u32, level: u32) -> Self {
        self.lines = lines;
        self.level = level;
        self
    }

    #[must_use]
    pub fn next_piece(&self) -> Option<PieceKind> {
        self.queue.first().copied()
    }

    /// Kind the hold command would bring into play, if hold is usable: the
    /// held piece, or the next queued piece when nothing is held yet.
    #[must_use]
    pub fn hold_alternative(&self) -> Option<PieceKind> {
        if !self.can_hold {
            return None;
        }
        self.held.or_else(|| self.next_piece())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_state() {
        let json = serde_json::json!({
            "board": ["....#.....", "#########."],
            "current": "T",
            "queue": ["I", "O"]
        });
        let state: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(state.current, Piece::new(PieceKind::T));
        assert_eq!(state.board.count_occupied(), 10);
        assert_eq!(state.next_piece(), Some(PieceKind::I));
        assert!(state.can_hold);
        assert_eq!(state.held, None);
        assert_eq!(state.hold_alternative(), Some(PieceKind::I));
    }

    #[test]
    fn test_round_trip_keeps_piece_position() {
        let mut state = GameState::new(BitBoard::from_ascii("##........"), PieceKind::L)
            .with_queue([PieceKind::S])
            .with_held(Some(PieceKind::J))
            .with_progress(42, 4);
        state.current = state.current.shifted(2, 3);
        let json = serde_json::to_string(&state).unwrap();
        let parsed: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_hold_alternative() {
        let state = GameState::new(BitBoard::EMPTY, PieceKind::T).with_held(Some(PieceKind::L));
        assert_eq!(state.hold_alternative(), Some(PieceKind::L));

        let empty = GameState::new(BitBoard::EMPTY, PieceKind::T);
        assert_eq!(empty.hold_alternative(), None);

        let mut locked = state.clone();
        locked.can_hold = false;
        assert_eq!(locked.hold_alternative(), None);
    }

    #[test]
    fn test_rejects_unknown_piece() {
        let json = r#"{ "board": [], "current": "X" }"#;
        assert!(serde_json::from_str::<GameState>(json).is_err());
    }
}
