//! Beam search over placements of the current piece and the known queue.
//!
//! The root ply scores every placement of the current piece, plus every
//! placement of the hold alternative when hold is usable. The best
//! `beam_width` paths are then extended one queue piece at a time, each
//! child scored against its parent's board and added to the parent's path
//! score. Paths are ranked by their mean score per placement, so a path that
//! ends early because its next piece is unknown competes fairly with longer
//! ones. The decision is the root candidate that starts the best path.
//!
//! The root ply is always scored completely. The clock and the cancel token
//! are polled after it, after every expanded ply and every 64 evaluations
//! within a ply. An interrupted ply is discarded, so the answer always comes
//! from the last complete ply.

use std::{
    mem,
    sync::Arc,
    time::{Duration, Instant},
};

use arrayvec::ArrayVec;
use log::{debug, trace};
use tetrabeam_engine::{GameState, Piece, PieceKind, generate_moves};
use tetrabeam_evaluator::{Evaluator, ResolvedWeights, WeightConfiguration};

use crate::{
    arena::{Node, SearchArena, SearchBuffers},
    cancel::CancelToken,
    config::{ConfigError, SearchConfig},
    decision::{Decision, Move, SearchOutcome},
};

/// Added to a path after which the next piece cannot spawn.
pub const TOP_OUT_PENALTY: f32 = -1.0e6;

/// Evaluations between two clock checks.
const CHECK_INTERVAL: u64 = 64;

/// Where an engine is in its decision cycle.
///
/// [`Engine::state`] can only be read between decisions; a
/// [`SearchWorker`](crate::SearchWorker) reports `Thinking` while a request
/// is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EngineState {
    Idle,
    Thinking,
    Completed,
    TimedOut,
    Cancelled,
}

impl EngineState {
    pub(crate) fn after(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Completed | SearchOutcome::NoLegalMove => Self::Completed,
            SearchOutcome::TimedOut => Self::TimedOut,
            SearchOutcome::Cancelled => Self::Cancelled,
        }
    }
}

/// Decides where to place pieces.
///
/// An engine is single-threaded and keeps its scratch buffers between
/// decisions; use one engine per thread (see [`SearchWorker`](crate::SearchWorker)).
#[derive(Debug)]
pub struct Engine {
    config: SearchConfig,
    evaluator: Evaluator,
    state: EngineState,
    arena: SearchArena,
}

impl Engine {
    pub fn new(config: SearchConfig, weights: Arc<WeightConfiguration>) -> Result<Self, ConfigError> {
        config.validate()?;
        let evaluator = Evaluator::new(weights, config.evaluator_options());
        Ok(Self {
            config,
            evaluator,
            state: EngineState::Idle,
            arena: SearchArena::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn decide(&mut self, game: &GameState) -> Decision {
        self.decide_with_cancel(game, &CancelToken::new())
    }

    pub fn decide_with_cancel(&mut self, game: &GameState, cancel: &CancelToken) -> Decision {
        self.state = EngineState::Thinking;
        let mut search = Search {
            config: &self.config,
            game,
            weights: self.evaluator.resolve(&game.board, game.lines, game.level),
            clock: Clock {
                start: Instant::now(),
                limit: self.config.thinking_time,
                cancel,
            },
            evaluations: 0,
            outcome: SearchOutcome::Completed,
            candidates: Vec::new(),
            depth_reached: 0,
        };
        let best = search.run(&mut self.arena.lease());
        let decision = search.finish(best);

        self.state = EngineState::after(decision.outcome);
        match &decision.best_move {
            Some(best) => debug!(
                "{:?} at col {} rot {}{} of {} candidates, score {:.3}, depth {}, {} evaluations in {:?} ({:?})",
                best.placement().kind(),
                best.placement().col(),
                best.placement().rotation().as_u8(),
                if best.use_hold() { " via hold" } else { "" },
                decision.candidates.len(),
                decision.best_score.unwrap_or_default(),
                decision.depth_reached,
                decision.evaluations,
                decision.elapsed,
                decision.outcome,
            ),
            None => debug!("no legal move for {:?}", game.current.kind()),
        }
        decision
    }
}

struct Clock<'a> {
    start: Instant,
    limit: Duration,
    cancel: &'a CancelToken,
}

impl Clock<'_> {
    fn interruption(&self) -> Option<SearchOutcome> {
        if self.cancel.is_cancelled() {
            Some(SearchOutcome::Cancelled)
        } else if self.start.elapsed() >= self.limit {
            Some(SearchOutcome::TimedOut)
        } else {
            None
        }
    }
}

/// A piece to place from a search state, and the hold and queue state after
/// placing it.
#[derive(Debug, Clone, Copy)]
struct Branch {
    piece: Piece,
    use_hold: bool,
    held: Option<PieceKind>,
    cursor: usize,
}

type Branches = ArrayVec<Branch, 2>;

enum Ply {
    Expanded,
    /// No beam node had a known next piece.
    QueueExhausted,
    Interrupted,
}

struct Best {
    root: usize,
    score: f32,
}

struct Search<'a> {
    config: &'a SearchConfig,
    game: &'a GameState,
    weights: ResolvedWeights,
    clock: Clock<'a>,
    evaluations: u64,
    outcome: SearchOutcome,
    candidates: Vec<Move>,
    depth_reached: usize,
}

impl Search<'_> {
    fn run(&mut self, buffers: &mut SearchBuffers) -> Option<Best> {
        self.score_root(buffers);
        if buffers.beam.is_empty() {
            self.outcome = SearchOutcome::NoLegalMove;
            return None;
        }
        retain_best(&mut buffers.beam, self.config.beam_width);
        self.depth_reached = 1;
        trace!(
            "root ply: {} candidates, {} evaluations",
            self.candidates.len(),
            self.evaluations
        );

        self.check();
        for _ in 0..self.config.lookahead_depth {
            if !self.outcome.is_completed() {
                break;
            }
            match self.expand(buffers) {
                Ply::Expanded => self.depth_reached += 1,
                Ply::QueueExhausted | Ply::Interrupted => break,
            }
            trace!("ply {}: {} evaluations", self.depth_reached, self.evaluations);
            if self.check() {
                break;
            }
        }

        buffers.beam.first().map(|node| Best {
            root: node.root,
            score: node.value(),
        })
    }

    fn finish(self, best: Option<Best>) -> Decision {
        let best_move = best
            .as_ref()
            .and_then(|best| self.candidates.get(best.root))
            .cloned();
        Decision {
            best_move,
            best_score: best.map(|best| best.score),
            candidates: self.candidates,
            evaluations: self.evaluations,
            elapsed: self.clock.start.elapsed(),
            timed_out: self.outcome.is_timed_out(),
            outcome: self.outcome,
            depth_reached: self.depth_reached,
            phase: self.weights.phase(),
            situations: self.weights.situations().to_vec(),
        }
    }

    /// Counts one evaluation and polls the clock every [`CHECK_INTERVAL`]
    /// evaluations. Returns `true` when the search has to stop.
    fn tick(&mut self) -> bool {
        self.evaluations += 1;
        self.evaluations % CHECK_INTERVAL == 0 && self.check()
    }

    fn check(&mut self) -> bool {
        let Some(outcome) = self.clock.interruption() else {
            return false;
        };
        trace!("search stopped ({outcome:?}) after {} evaluations", self.evaluations);
        self.outcome = outcome;
        true
    }

    /// Scores every root move without polling the clock, so the candidate
    /// list is always complete.
    fn score_root(&mut self, buffers: &mut SearchBuffers) {
        let game = self.game;
        let mut branches = Branches::new();
        branches.push(Branch {
            piece: game.current,
            use_hold: false,
            held: game.held,
            cursor: 0,
        });
        if self.config.hold {
            if let Some(alternative) = game.hold_alternative() {
                branches.push(Branch {
                    piece: Piece::new(alternative),
                    use_hold: true,
                    held: Some(game.current.kind()),
                    cursor: usize::from(game.held.is_none()),
                });
            }
        }

        let SearchBuffers { moves, beam, .. } = buffers;
        for branch in &branches {
            let start = moves.len();
            generate_moves(&game.board, &branch.piece, branch.use_hold, moves);
            for generated in &moves[start..] {
                let evaluation =
                    self.weights
                        .evaluate(&game.board, *generated.placement(), preview(game, branch.cursor));
                let mut node = Node {
                    board: evaluation.board,
                    held: branch.held,
                    cursor: branch.cursor,
                    score: evaluation.score,
                    plies: 1,
                    root: self.candidates.len(),
                    alive: true,
                };
                check_spawn(&mut node, &game.queue);
                self.candidates
                    .push(Move::new(generated, node.score, evaluation.cleared));
                beam.push(node);
                self.evaluations += 1;
            }
        }
    }

    fn expand(&mut self, buffers: &mut SearchBuffers) -> Ply {
        let game = self.game;
        let SearchBuffers { moves, beam, next } = buffers;
        next.clear();
        let mut expanded = false;

        for node in beam.iter() {
            let Some(branches) = self.branches(node) else {
                next.push(node.clone());
                continue;
            };
            expanded = true;
            moves.clear();
            for branch in &branches {
                let start = moves.len();
                generate_moves(&node.board, &branch.piece, branch.use_hold, moves);
                for generated in &moves[start..] {
                    let evaluation =
                        self.weights
                            .evaluate(&node.board, *generated.placement(), preview(game, branch.cursor));
                    let mut child = Node {
                        board: evaluation.board,
                        held: branch.held,
                        cursor: branch.cursor,
                        score: node.score + evaluation.score,
                        plies: node.plies + 1,
                        root: node.root,
                        alive: true,
                    };
                    check_spawn(&mut child, &game.queue);
                    next.push(child);
                    if self.tick() {
                        return Ply::Interrupted;
                    }
                }
            }
            if moves.is_empty() {
                let mut blocked = node.clone();
                blocked.score += TOP_OUT_PENALTY;
                blocked.alive = false;
                next.push(blocked);
            }
        }

        if !expanded {
            return Ply::QueueExhausted;
        }
        retain_best(next, self.config.beam_width);
        mem::swap(beam, next);
        Ply::Expanded
    }

    /// The pieces `node` can play next; `None` if the path ends here.
    fn branches(&self, node: &Node) -> Option<Branches> {
        if !node.alive {
            return None;
        }
        let &kind = self.game.queue.get(node.cursor)?;
        let cursor = node.cursor + 1;
        let mut branches = Branches::new();
        branches.push(Branch {
            piece: Piece::new(kind),
            use_hold: false,
            held: node.held,
            cursor,
        });
        if self.config.hold {
            let alternative = node
                .held
                .or_else(|| self.game.queue.get(cursor).copied());
            if let Some(alternative) = alternative {
                branches.push(Branch {
                    piece: Piece::new(alternative),
                    use_hold: true,
                    held: Some(kind),
                    cursor: cursor + usize::from(node.held.is_none()),
                });
            }
        }
        Some(branches)
    }
}

fn preview(game: &GameState, cursor: usize) -> &[PieceKind] {
    game.queue.get(cursor..).unwrap_or_default()
}

/// Ends the path if the piece at the node's cursor is blocked where it spawns.
fn check_spawn(node: &mut Node, queue: &[PieceKind]) {
    let Some(&next) = queue.get(node.cursor) else {
        return;
    };
    if node.board.is_colliding(&Piece::new(next)) {
        node.score += TOP_OUT_PENALTY;
        node.alive = false;
    }
}

/// Keeps the `width` best nodes; ties keep enumeration order.
fn retain_best(nodes: &mut Vec<Node>, width: usize) {
    nodes.sort_by(|a, b| b.value().total_cmp(&a.value()));
    nodes.truncate(width);
}

#[cfg(test)]
mod tests {
    use tetrabeam_engine::BitBoard;

    use super::*;

    fn node(score: f32, root: usize) -> Node {
        Node {
            board: BitBoard::EMPTY,
            held: None,
            cursor: 0,
            score,
            plies: 1,
            root,
            alive: true,
        }
    }

    #[test]
    fn test_retain_best_is_stable() {
        let mut nodes = vec![node(1.0, 0), node(3.0, 1), node(3.0, 2), node(2.0, 3)];
        retain_best(&mut nodes, 3);
        let roots: Vec<_> = nodes.iter().map(|n| n.root).collect();
        assert_eq!(roots, [1, 2, 3]);
    }

    #[test]
    fn test_retain_best_ranks_short_paths_per_placement() {
        // a two-piece path against one that stopped when the queue ran out
        let line_clear = Node {
            plies: 2,
            ..node(-477.6, 0)
        };
        let held = node(-244.8, 1);
        let mut nodes = vec![held, line_clear];
        retain_best(&mut nodes, 1);
        assert_eq!(nodes[0].root, 0);
    }

    #[test]
    fn test_check_spawn_flags_blocked_next_piece() {
        let mut board = BitBoard::EMPTY;
        for row in 0..4 {
            for col in 3..7 {
                board.set_cell(row, col);
            }
        }
        let mut blocked = Node { board, ..node(-5.0, 0) };
        check_spawn(&mut blocked, &[PieceKind::T]);
        assert!(!blocked.alive);
        assert!(blocked.score < TOP_OUT_PENALTY + 1.0);

        let mut open = node(-5.0, 0);
        check_spawn(&mut open, &[PieceKind::T]);
        assert!(open.alive);

        // unknown next piece
        let mut unknown = Node { cursor: 1, ..blocked.clone() };
        unknown.alive = true;
        check_spawn(&mut unknown, &[PieceKind::T]);
        assert!(unknown.alive);
    }

    #[test]
    fn test_hold_branches_track_queue_cursor() {
        let config = SearchConfig::default();
        let game = GameState::new(BitBoard::EMPTY, PieceKind::T).with_queue([PieceKind::I, PieceKind::O, PieceKind::S]);
        let cancel = CancelToken::new();
        let evaluator = Evaluator::new(Arc::new(WeightConfiguration::builtin()), config.evaluator_options());
        let search = Search {
            config: &config,
            game: &game,
            weights: evaluator.resolve(&game.board, 0, 0),
            clock: Clock {
                start: Instant::now(),
                limit: config.thinking_time,
                cancel: &cancel,
            },
            evaluations: 0,
            outcome: SearchOutcome::Completed,
            candidates: Vec::new(),
            depth_reached: 0,
        };

        // nothing held: holding I brings O into play
        let empty_hand = search.branches(&node(0.0, 0)).unwrap();
        assert_eq!(empty_hand.len(), 2);
        assert_eq!((empty_hand[0].piece.kind(), empty_hand[0].cursor), (PieceKind::I, 1));
        assert_eq!((empty_hand[1].piece.kind(), empty_hand[1].cursor), (PieceKind::O, 2));
        assert_eq!(empty_hand[1].held, Some(PieceKind::I));

        // something held: holding swaps it in without consuming the queue
        let holding = Node {
            held: Some(PieceKind::Z),
            ..node(0.0, 0)
        };
        let swapped = search.branches(&holding).unwrap();
        assert_eq!((swapped[1].piece.kind(), swapped[1].cursor), (PieceKind::Z, 1));

        let exhausted = Node { cursor: 3, ..node(0.0, 0) };
        assert!(search.branches(&exhausted).is_none());
    }
}
