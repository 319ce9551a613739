use std::time::Duration;

use serde::{Serialize, Serializer};
use tetrabeam_engine::{Action, ActionSequence, ClearedRows, GeneratedMove, Placement};
use tetrabeam_evaluator::{GamePhase, SituationKind};

/// A root candidate: one placement of the current (or held) piece.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Move {
    placement: Placement,
    actions: ActionSequence,
    use_hold: bool,
    /// Evaluation of this placement alone, without lookahead.
    score: f32,
    cleared: ClearedRows,
}

impl Move {
    pub(crate) fn new(generated: &GeneratedMove, score: f32, cleared: ClearedRows) -> Self {
        Self {
            placement: *generated.placement(),
            actions: generated.actions().iter().copied().collect(),
            use_hold: generated.use_hold(),
            score,
            cleared,
        }
    }

    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Commands a controller executes, ending with a hard drop.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub fn use_hold(&self) -> bool {
        self.use_hold
    }

    #[must_use]
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Rows this placement clears.
    #[must_use]
    pub fn cleared(&self) -> ClearedRows {
        self.cleared
    }
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    Completed,
    /// The thinking-time limit was reached; the best move of the last fully
    /// searched ply is returned.
    TimedOut,
    Cancelled,
    /// The current piece cannot be placed (neither can the hold alternative).
    NoLegalMove,
}

/// Result of one decision.
///
/// `best_move`, when present, is always one of `candidates`.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub best_move: Option<Move>,
    /// Mean score per placement along the best path, lookahead plies
    /// included.
    pub best_score: Option<f32>,
    /// Every root move, hold moves included, in enumeration order.
    pub candidates: Vec<Move>,
    pub evaluations: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,
    pub timed_out: bool,
    pub outcome: SearchOutcome,
    /// Plies fully searched, the root ply included.
    pub depth_reached: usize,
    pub phase: GamePhase,
    pub situations: Vec<SituationKind>,
}

impl Decision {
    /// Index of `best_move` in `candidates`.
    #[must_use]
    pub fn best_index(&self) -> Option<usize> {
        let best = self.best_move.as_ref()?;
        self.candidates.iter().position(|m| m == best)
    }
}

fn serialize_elapsed<S>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}
