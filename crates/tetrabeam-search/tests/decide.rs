use std::{sync::Arc, time::Duration};

use tetrabeam_engine::{Action, BitBoard, GameState, PieceKind};
use tetrabeam_evaluator::{EvaluatorProfile, WeightConfiguration};
use tetrabeam_search::{CancelToken, Engine, EngineState, SearchConfig, SearchOutcome, SearchWorker};

fn engine(config: SearchConfig) -> Engine {
    Engine::new(config, Arc::new(WeightConfiguration::builtin())).unwrap()
}

fn unhurried() -> SearchConfig {
    SearchConfig {
        thinking_time: Duration::from_secs(30),
        ..SearchConfig::default()
    }
}

fn opening() -> GameState {
    GameState::new(BitBoard::EMPTY, PieceKind::T).with_queue([PieceKind::I, PieceKind::O, PieceKind::S])
}

#[test]
fn test_i_piece_takes_the_line_clear() {
    let game = GameState::new(BitBoard::from_ascii("#########."), PieceKind::I);
    for profile in [EvaluatorProfile::PatternAugmented, EvaluatorProfile::Dellacherie] {
        let mut engine = engine(SearchConfig {
            lookahead_depth: 0,
            profile,
            ..unhurried()
        });
        let decision = engine.decide(&game);
        let best = decision.best_move.unwrap();
        assert_eq!(best.cleared().len(), 1, "{profile}");
        assert_eq!(best.placement().col(), 9, "{profile}");
        assert_eq!(best.actions().last(), Some(&Action::HardDrop));
        assert!(!best.use_hold());
    }
}

#[test]
fn test_line_clear_beats_holding_away_a_short_queue() {
    // holding I plays the only preview piece, leaving a one-placement path
    // to compete with two-placement paths
    let game = GameState::new(BitBoard::from_ascii("#########."), PieceKind::I).with_queue([PieceKind::O]);
    let mut engine = engine(unhurried());
    let decision = engine.decide(&game);
    assert_eq!(decision.outcome, SearchOutcome::Completed);
    assert_eq!(decision.depth_reached, 2);
    let best = decision.best_move.unwrap();
    assert!(!best.use_hold());
    assert_eq!(best.cleared().len(), 1);
    assert_eq!(best.placement().col(), 9);
}

#[test]
fn test_hold_doubles_candidates() {
    let game = GameState::new(BitBoard::EMPTY, PieceKind::T).with_held(Some(PieceKind::L));
    let config = SearchConfig {
        lookahead_depth: 0,
        ..unhurried()
    };

    let with_hold = engine(config.clone()).decide(&game);
    let without_hold = engine(SearchConfig { hold: false, ..config }).decide(&game);
    assert_eq!(without_hold.candidates.len(), 34);
    assert_eq!(with_hold.candidates.len(), 2 * without_hold.candidates.len());

    let held: Vec<_> = with_hold.candidates.iter().filter(|m| m.use_hold()).collect();
    assert_eq!(held.len(), 34);
    assert!(held.iter().all(|m| m.placement().kind() == PieceKind::L));
    assert!(held.iter().all(|m| m.actions().first() == Some(&Action::Hold)));
}

#[test]
fn test_zero_thinking_time_still_moves() {
    let mut engine = engine(SearchConfig {
        thinking_time: Duration::ZERO,
        ..SearchConfig::default()
    });
    let decision = engine.decide(&opening());
    assert!(decision.timed_out);
    assert_eq!(decision.outcome, SearchOutcome::TimedOut);
    assert_eq!(decision.depth_reached, 1);
    assert!(decision.best_move.is_some());
    assert!(decision.best_index().is_some());
    assert_eq!(engine.state(), EngineState::TimedOut);
}

#[test]
fn test_zero_thinking_time_scores_every_root_move() {
    // 68 root moves, more than one clock-check interval
    let game = GameState::new(BitBoard::EMPTY, PieceKind::T)
        .with_held(Some(PieceKind::L))
        .with_queue([PieceKind::I, PieceKind::O]);
    let mut engine = engine(SearchConfig {
        thinking_time: Duration::ZERO,
        ..SearchConfig::default()
    });
    let decision = engine.decide(&game);
    assert!(decision.timed_out);
    assert_eq!(decision.depth_reached, 1);
    assert_eq!(decision.candidates.len(), 68);
    assert_eq!(decision.candidates.iter().filter(|m| m.use_hold()).count(), 34);
    assert_eq!(decision.evaluations, 68);
    assert!(decision.best_index().is_some());
}

#[test]
fn test_best_move_is_a_candidate() {
    let board = BitBoard::from_ascii(
        "
        ..........
        #.........
        ##...#....
        ###.###.##
        ",
    );
    let game = GameState::new(board, PieceKind::S).with_queue([PieceKind::Z, PieceKind::T, PieceKind::I]);
    let mut engine = engine(SearchConfig {
        lookahead_depth: 2,
        ..unhurried()
    });
    let decision = engine.decide(&game);
    assert_eq!(decision.outcome, SearchOutcome::Completed);
    assert_eq!(decision.depth_reached, 3);
    let index = decision.best_index().unwrap();
    assert_eq!(decision.candidates[index].placement(), decision.best_move.unwrap().placement());
    assert!(decision.evaluations > decision.candidates.len() as u64);
}

#[test]
fn test_lookahead_stops_at_the_end_of_the_queue() {
    let config = SearchConfig {
        hold: false,
        lookahead_depth: 3,
        ..unhurried()
    };
    let queued = GameState::new(BitBoard::EMPTY, PieceKind::T).with_queue([PieceKind::I]);
    let decision = engine(config.clone()).decide(&queued);
    assert_eq!(decision.outcome, SearchOutcome::Completed);
    assert_eq!(decision.depth_reached, 2);

    let alone = GameState::new(BitBoard::EMPTY, PieceKind::T);
    let decision = engine(config).decide(&alone);
    assert_eq!(decision.depth_reached, 1);
    assert_eq!(decision.evaluations, 34);
}

#[test]
fn test_decisions_are_deterministic() {
    let game = opening();
    let first = engine(unhurried()).decide(&game);
    let second = engine(unhurried()).decide(&game);
    assert_eq!(first.outcome, SearchOutcome::Completed);
    assert_eq!(first.best_move, second.best_move);
    assert_eq!(first.best_score, second.best_score);
    assert_eq!(first.candidates, second.candidates);
    assert_eq!(first.evaluations, second.evaluations);

    // the same engine gives the same answer again
    let mut reused = engine(unhurried());
    let _ = reused.decide(&GameState::new(BitBoard::from_ascii("####.#####"), PieceKind::Z));
    assert_eq!(reused.decide(&game).best_move, first.best_move);
}

#[test]
fn test_cancelled_search_returns_a_move() {
    let mut engine = engine(unhurried());
    assert_eq!(engine.state(), EngineState::Idle);
    let cancel = CancelToken::new();
    cancel.cancel();
    let decision = engine.decide_with_cancel(&opening(), &cancel);
    assert_eq!(decision.outcome, SearchOutcome::Cancelled);
    assert!(!decision.timed_out);
    assert!(decision.best_index().is_some());
    assert_eq!(engine.state(), EngineState::Cancelled);

    let decision = engine.decide(&opening());
    assert_eq!(decision.outcome, SearchOutcome::Completed);
    assert_eq!(engine.state(), EngineState::Completed);
}

#[test]
fn test_blocked_spawn_has_no_legal_move() {
    let mut board = BitBoard::EMPTY;
    for row in 0..4 {
        for col in 2..8 {
            board.set_cell(row, col);
        }
    }
    let game = GameState::new(board, PieceKind::T).with_queue([PieceKind::I]);
    let mut engine = engine(unhurried());
    let decision = engine.decide(&game);
    assert_eq!(decision.outcome, SearchOutcome::NoLegalMove);
    assert!(decision.best_move.is_none());
    assert!(decision.candidates.is_empty());
    assert_eq!(engine.state(), EngineState::Completed);
}

#[test]
fn test_decision_json() {
    let decision = engine(unhurried()).decide(&opening());
    let json = serde_json::to_value(&decision).unwrap();
    assert_eq!(json["outcome"], "completed");
    assert_eq!(json["timed_out"], false);
    assert!(json["elapsed_ms"].is_number());
    assert_eq!(json["phase"], "early");
    let actions = json["best_move"]["actions"].as_array().unwrap();
    assert_eq!(actions.last().unwrap(), "hard_drop");
}

#[test]
fn test_worker_answers_every_request() {
    let mut worker = SearchWorker::spawn(engine(unhurried())).unwrap();
    assert_eq!(worker.state(), EngineState::Idle);
    let first = worker.submit(opening());
    let second = worker.submit(GameState::new(BitBoard::from_ascii("#########."), PieceKind::I));
    assert_eq!(worker.state(), EngineState::Thinking);

    let response = worker.recv().unwrap();
    assert_eq!(response.id, first);
    assert!(response.decision.best_move.is_some());
    // still waiting on the latest request
    assert_eq!(worker.state(), EngineState::Thinking);

    let response = worker.recv().unwrap();
    assert_eq!(response.id, second);
    assert_eq!(response.decision.outcome, SearchOutcome::Completed);
    assert_eq!(worker.state(), EngineState::Completed);
    assert!(worker.try_recv().is_err());
}
