use serde::{Deserialize, Serialize};

use crate::RotationDirection;

/// A discrete input command, as issued by a controller against a live game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[display("move_left")]
    MoveLeft,
    #[display("move_right")]
    MoveRight,
    #[display("rotate_clockwise")]
    RotateClockwise,
    #[display("rotate_counterclockwise")]
    RotateCounterclockwise,
    #[display("rotate_180")]
    #[serde(rename = "rotate_180")]
    Rotate180,
    #[display("hard_drop")]
    HardDrop,
    #[display("hold")]
    Hold,
}

impl Action {
    #[must_use]
    pub const fn rotate(direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Clockwise => Self::RotateClockwise,
            RotationDirection::Counterclockwise => Self::RotateCounterclockwise,
            RotationDirection::Half => Self::Rotate180,
        }
    }

    #[must_use]
    pub const fn rotation_direction(self) -> Option<RotationDirection> {
        match self {
            Self::RotateClockwise => Some(RotationDirection::Clockwise),
            Self::RotateCounterclockwise => Some(RotationDirection::Counterclockwise),
            Self::Rotate180 => Some(RotationDirection::Half),
            _ => None,
        }
    }

    /// Horizontal step in columns for lateral moves.
    #[must_use]
    pub const fn shift(self) -> Option<i8> {
        match self {
            Self::MoveLeft => Some(-1),
            Self::MoveRight => Some(1),
            _ => None,
        }
    }
}
