//! Review and live play driven by a scripted in-memory engine.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chess_analysis::{
    AnalysisConfig, AnalysisEngine, AnalyzerError, EngineError, EngineFactory, GameAnalyzer,
    LiveCoach, LiveError, LiveGame, MoveQuality, PositionAnalysis, RulesError, Score, SearchLimit,
    STARTING_FEN,
};
use chess_core::{Color, Square};

#[derive(Default)]
struct Script {
    responses: Mutex<VecDeque<PositionAnalysis>>,
    positions: Mutex<Vec<String>>,
    live_handles: AtomicUsize,
    acquired: AtomicUsize,
    new_games: AtomicUsize,
}

#[derive(Clone, Default)]
struct ScriptedFactory(Arc<Script>);

impl ScriptedFactory {
    fn with(responses: Vec<PositionAnalysis>) -> Self {
        let factory = Self::default();
        *factory.0.responses.lock().unwrap() = responses.into();
        factory
    }

    fn live_handles(&self) -> usize {
        self.0.live_handles.load(Ordering::SeqCst)
    }

    fn acquired(&self) -> usize {
        self.0.acquired.load(Ordering::SeqCst)
    }

    fn positions(&self) -> Vec<String> {
        self.0.positions.lock().unwrap().clone()
    }
}

struct ScriptedEngine(Arc<Script>);

impl AnalysisEngine for ScriptedEngine {
    fn new_game(&mut self) -> Result<(), EngineError> {
        self.0.new_games.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn analyse(&mut self, fen: &str, _limit: SearchLimit) -> Result<PositionAnalysis, EngineError> {
        self.0.positions.lock().unwrap().push(fen.to_string());
        self.0
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| EngineError::InvalidResponse("script exhausted".to_string()))
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.0.live_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

impl EngineFactory for ScriptedFactory {
    type Engine = ScriptedEngine;

    fn acquire(&self) -> Result<ScriptedEngine, EngineError> {
        self.0.acquired.fetch_add(1, Ordering::SeqCst);
        self.0.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedEngine(Arc::clone(&self.0)))
    }
}

fn cp(score: i32, pv: &[&str]) -> PositionAnalysis {
    PositionAnalysis {
        best_move: pv.first().map(|m| m.to_string()),
        score: Some(Score::Centipawns(score)),
        depth: 12,
        nodes: 10_000,
        pv: pv.iter().map(|m| m.to_string()).collect(),
    }
}

fn unscored() -> PositionAnalysis {
    PositionAnalysis {
        depth: 1,
        ..Default::default()
    }
}

const SHORT_GAME: &str = "[White \"Ann\"]\n[Black \"Ben\"]\n\n1. e4 e5 2. Nf3 *";

#[test]
fn three_ply_game_is_graded_per_ply() {
    let factory = ScriptedFactory::with(vec![
        cp(30, &["e2e4", "e7e5"]),
        cp(-25, &["e7e5"]),
        cp(-25, &["c7c5"]),
        cp(40, &["g1f3"]),
        cp(40, &["g1f3"]),
        cp(100, &["b8c6"]),
    ]);
    let analyzer = GameAnalyzer::new(factory.clone(), AnalysisConfig::default());

    let analysis = analyzer.analyze_pgn(SHORT_GAME).unwrap();

    assert_eq!(analysis.moves.len(), 3);
    assert_eq!(analysis.fens.len(), 4);
    assert_eq!(analysis.fens[0], STARTING_FEN);
    assert_eq!(analysis.evals, vec![Some(30), Some(25), Some(40), Some(-100)]);
    assert_eq!(analysis.move_labels, vec!["1. e4", "1... e5", "2. Nf3"]);
    assert_eq!(analysis.game_info.white, "Ann");
    assert_eq!(analysis.game_info.event, "Unknown Event");

    let reply = &analysis.moves[1];
    assert_eq!(reply.side, Color::Black);
    assert_eq!(reply.move_number, 1);
    assert_eq!(reply.best_san, "c5");
    assert_eq!((reply.eval_before, reply.eval_after), (Some(-25), Some(-40)));
    assert_eq!(reply.cp_loss, Some(15));
    assert_eq!(reply.classification, Some(MoveQuality::Best));

    let third = &analysis.moves[2];
    assert_eq!(third.cp_loss, Some(140));
    assert_eq!(third.classification, Some(MoveQuality::Inaccuracy));

    assert_eq!(analysis.white_stats.total_moves, 2);
    assert_eq!(analysis.white_stats.inaccuracies, 1);
    assert_eq!(analysis.black_stats.best_moves, 1);

    // Each ply is searched before and after, the snapshots in between.
    let positions = factory.positions();
    assert_eq!(positions.len(), 6);
    assert_eq!(positions[1], analysis.fens[1]);
    assert_eq!(positions[2], analysis.fens[1]);
    assert_eq!(positions[5], analysis.fens[3]);

    assert_eq!(factory.acquired(), 1);
    assert_eq!(factory.0.new_games.load(Ordering::SeqCst), 1);
    assert_eq!(factory.live_handles(), 0);
}

#[test]
fn missing_scores_stay_ungraded() {
    let factory = ScriptedFactory::with(vec![unscored(), cp(-20, &[]), cp(-20, &[]), unscored()]);
    let analyzer = GameAnalyzer::new(factory, AnalysisConfig::default());

    let analysis = analyzer.analyze_pgn("1. d4 d5").unwrap();

    assert_eq!(analysis.evals, vec![None, Some(20), None]);
    for record in &analysis.moves {
        assert_eq!(record.cp_loss, None);
        assert_eq!(record.classification, None);
    }
    assert_eq!(analysis.moves[0].best_san, "N/A");
    assert_eq!(analysis.moves[0].eval_after, Some(20));
    assert_eq!(analysis.moves[1].eval_before, Some(-20));
    assert_eq!(analysis.white_stats.graded_moves, 0);
}

#[test]
fn engine_failure_releases_the_handle() {
    let factory = ScriptedFactory::with(vec![cp(30, &["e2e4"]), cp(-30, &["e7e5"])]);
    let analyzer = GameAnalyzer::new(factory.clone(), AnalysisConfig::default());

    let err = analyzer.analyze_pgn(SHORT_GAME).unwrap_err();

    assert!(matches!(err, AnalyzerError::Engine(EngineError::InvalidResponse(_))));
    assert_eq!(factory.acquired(), 1);
    assert_eq!(factory.live_handles(), 0);
}

#[test]
fn unparseable_game_never_starts_an_engine() {
    let factory = ScriptedFactory::default();
    let analyzer = GameAnalyzer::new(factory.clone(), AnalysisConfig::default());

    assert!(matches!(
        analyzer.analyze_pgn("1. e4 e5 2. Qxf7"),
        Err(AnalyzerError::Rules(RulesError::IllegalMove { ply: 3, .. }))
    ));
    assert!(matches!(
        analyzer.analyze_pgn("hello"),
        Err(AnalyzerError::Rules(RulesError::InvalidPgn(_)))
    ));
    assert_eq!(factory.acquired(), 0);
}

#[test]
fn black_player_receives_engine_first_move() {
    let factory = ScriptedFactory::with(vec![cp(25, &["e2e4", "c7c5"])]);
    let coach = LiveCoach::new(factory.clone(), AnalysisConfig::default());

    let (game, update) = coach.start(Color::Black).unwrap();

    assert_eq!(game.moves_uci, vec!["e2e4"]);
    assert_eq!(update.engine_move.as_deref(), Some("e4"));
    assert!(update.fen.contains(" b KQkq"));
    assert_eq!(factory.live_handles(), 0);
}

#[test]
fn white_player_starts_without_engine() {
    let factory = ScriptedFactory::default();
    let coach = LiveCoach::new(factory.clone(), AnalysisConfig::default());

    let (game, update) = coach.start(Color::White).unwrap();

    assert!(game.moves_uci.is_empty());
    assert_eq!(update.fen, STARTING_FEN);
    assert_eq!(update.engine_move, None);
    assert_eq!(factory.acquired(), 0);
}

#[test]
fn player_move_is_graded_and_answered() {
    let factory = ScriptedFactory::with(vec![cp(20, &["d2d4"]), cp(-20, &["e7e5", "g1f3"])]);
    let coach = LiveCoach::new(factory.clone(), AnalysisConfig::default());
    let mut game = LiveGame::new(Color::White);

    let feedback = coach.play_move(&mut game, "e2e4").unwrap();

    assert_eq!(feedback.player_move, "e4");
    assert_eq!(feedback.best_move.as_deref(), Some("d4"));
    assert_eq!(feedback.engine_move.as_deref(), Some("e5"));
    assert_eq!(feedback.cp_loss, Some(0));
    assert_eq!(feedback.classification, Some(MoveQuality::Best));
    assert!(!feedback.game_over);
    assert_eq!(feedback.result, "*");
    assert_eq!(game.moves_uci, vec!["e2e4", "e7e5"]);
    assert_eq!(feedback.fen, game.fen().unwrap());
    assert_eq!(factory.live_handles(), 0);
}

#[test]
fn mating_move_ends_the_game_without_reply() {
    let factory = ScriptedFactory::with(vec![
        PositionAnalysis {
            score: Some(Score::Mate(1)),
            pv: vec!["d8h4".to_string()],
            best_move: Some("d8h4".to_string()),
            ..Default::default()
        },
        PositionAnalysis {
            score: Some(Score::Mate(0)),
            ..Default::default()
        },
    ]);
    let coach = LiveCoach::new(factory, AnalysisConfig::default());
    let mut game = LiveGame {
        moves_uci: vec!["f2f3".into(), "e7e5".into(), "g2g4".into()],
        player_color: Color::Black,
    };

    let feedback = coach.play_move(&mut game, "d8h4").unwrap();

    assert_eq!(feedback.player_move, "Qh4#");
    assert_eq!(feedback.engine_move, None);
    assert!(feedback.game_over);
    assert_eq!(feedback.result, "0-1");
    assert_eq!(feedback.classification, Some(MoveQuality::Best));
    assert!(matches!(coach.hint(&game), Err(LiveError::GameOver)));
}

#[test]
fn rejected_moves_leave_the_game_untouched() {
    let factory = ScriptedFactory::default();
    let coach = LiveCoach::new(factory.clone(), AnalysisConfig::default());
    let mut game = LiveGame::new(Color::White);

    assert!(matches!(
        coach.play_move(&mut game, "e2e5"),
        Err(LiveError::Rules(RulesError::IllegalMove { .. }))
    ));
    assert!(matches!(
        coach.play_move(&mut game, "castle"),
        Err(LiveError::Rules(RulesError::InvalidUci(_)))
    ));
    assert!(game.moves_uci.is_empty());

    game.moves_uci.push("e2e4".to_string());
    assert!(matches!(
        coach.play_move(&mut game, "e7e5"),
        Err(LiveError::NotPlayersTurn)
    ));
    assert_eq!(game.moves_uci, vec!["e2e4"]);
    assert_eq!(factory.acquired(), 0);
}

#[test]
fn engine_failure_during_move_keeps_game() {
    let factory = ScriptedFactory::with(vec![cp(20, &["d2d4"])]);
    let coach = LiveCoach::new(factory.clone(), AnalysisConfig::default());
    let mut game = LiveGame::new(Color::White);

    assert!(matches!(
        coach.play_move(&mut game, "e2e4"),
        Err(LiveError::Engine(_))
    ));
    assert!(game.moves_uci.is_empty());
    assert_eq!(factory.live_handles(), 0);
}

#[test]
fn undo_at_start_fails() {
    let coach = LiveCoach::new(ScriptedFactory::default(), AnalysisConfig::default());
    let mut game = LiveGame::new(Color::White);
    assert!(matches!(coach.undo(&mut game), Err(LiveError::NothingToUndo)));
}

#[test]
fn undo_takes_back_a_full_turn() {
    let coach = LiveCoach::new(ScriptedFactory::default(), AnalysisConfig::default());
    let mut game = LiveGame {
        moves_uci: vec!["e2e4".into(), "e7e5".into(), "g1f3".into(), "b8c6".into()],
        player_color: Color::White,
    };

    let update = coach.undo(&mut game).unwrap();

    assert_eq!(game.moves_uci, vec!["e2e4", "e7e5"]);
    assert_eq!(update.engine_move, None);
    assert_eq!(update.fen, game.fen().unwrap());
}

#[test]
fn undo_replays_engine_opening_for_black() {
    let factory = ScriptedFactory::with(vec![cp(30, &["d2d4"])]);
    let coach = LiveCoach::new(factory.clone(), AnalysisConfig::default());
    let mut game = LiveGame {
        moves_uci: vec!["e2e4".into()],
        player_color: Color::Black,
    };

    let update = coach.undo(&mut game).unwrap();

    assert_eq!(game.moves_uci, vec!["d2d4"]);
    assert_eq!(update.engine_move.as_deref(), Some("d4"));
    assert_eq!(factory.live_handles(), 0);
}

#[test]
fn hint_requires_players_turn() {
    let coach = LiveCoach::new(ScriptedFactory::default(), AnalysisConfig::default());
    let game = LiveGame {
        moves_uci: vec!["e2e4".into()],
        player_color: Color::White,
    };
    assert!(matches!(coach.hint(&game), Err(LiveError::NotPlayersTurn)));
}

#[test]
fn hint_names_squares_and_evaluation() {
    let factory = ScriptedFactory::with(vec![cp(-35, &["g8f6", "b1c3"])]);
    let coach = LiveCoach::new(factory, AnalysisConfig::default());
    let game = LiveGame {
        moves_uci: vec!["e2e4".into()],
        player_color: Color::Black,
    };

    let hint = coach.hint(&game).unwrap();

    assert_eq!(hint.best_move_uci, "g8f6");
    assert_eq!(hint.best_move_san, "Nf6");
    assert_eq!(hint.from_square, "g8".parse::<Square>().unwrap());
    assert_eq!(hint.to_square, "f6".parse::<Square>().unwrap());
    assert_eq!(hint.eval_cp, Some(-35));
}

#[test]
fn hint_without_engine_move_fails() {
    let factory = ScriptedFactory::with(vec![unscored()]);
    let coach = LiveCoach::new(factory, AnalysisConfig::default());
    let game = LiveGame::new(Color::White);
    assert!(matches!(coach.hint(&game), Err(LiveError::NoEngineMove)));
}
