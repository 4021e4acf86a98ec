//! Integration tests against a real engine.
//!
//! These tests require Stockfish to be installed and available in PATH.
//! Run with: `cargo test -p chess-analysis --test integration -- --ignored`

use std::time::Duration;

use chess_analysis::sample::OPERA_GAME_PGN;
use chess_analysis::{
    AnalysisConfig, AnalysisEngine, EngineSettings, GameAnalyzer, LiveCoach, LiveGame, MoveQuality,
    SearchLimit, UciEngine, UciEngineFactory, STARTING_FEN,
};
use chess_core::Color;

/// Check if Stockfish is available in PATH.
fn stockfish_available() -> bool {
    std::process::Command::new("stockfish")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok()
}

fn fast_config() -> AnalysisConfig {
    AnalysisConfig {
        analysis_limit: SearchLimit::Depth(10),
        live_limit: SearchLimit::MoveTime(Duration::from_millis(50)),
    }
}

#[test]
#[ignore = "requires Stockfish"]
fn test_engine_basic_analysis() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    let mut engine =
        UciEngine::spawn("stockfish", EngineSettings::default()).expect("Failed to start engine");
    assert!(
        engine.name().to_lowercase().contains("stockfish"),
        "Engine name should contain 'Stockfish', got: {}",
        engine.name()
    );

    engine.new_game().expect("ucinewgame failed");
    let analysis = engine
        .analyse(STARTING_FEN, SearchLimit::Depth(10))
        .expect("Failed to analyze starting position");

    assert!(analysis.best_move.is_some(), "Best move should be present");
    assert!(analysis.score.is_some(), "Score should be present");
    assert!(analysis.depth >= 10, "Search depth should be at least 10, got: {}", analysis.depth);
}

#[test]
#[ignore = "requires Stockfish"]
fn test_checkmated_position_has_no_best_move() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    let mut engine =
        UciEngine::spawn("stockfish", EngineSettings::default()).expect("Failed to start engine");
    let mated = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
    let analysis = engine
        .analyse(mated, SearchLimit::Depth(5))
        .expect("Failed to analyze mated position");
    assert_eq!(analysis.best_move, None);
}

#[test]
#[ignore = "requires Stockfish"]
fn test_scholars_mate_blunder() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    // 3...Nf6?? allows Qxf7#
    let pgn = "1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0";
    let factory = UciEngineFactory::new("stockfish", EngineSettings::default());
    let analyzer = GameAnalyzer::new(factory, fast_config());

    let analysis = analyzer.analyze_pgn(pgn).expect("Failed to analyze game");

    let nf6 = &analysis.moves[5];
    assert_eq!(nf6.san, "Nf6");
    assert_eq!(
        nf6.classification,
        Some(MoveQuality::Blunder),
        "Nf6 should be a Blunder, cp loss: {:?}",
        nf6.cp_loss
    );
    assert_eq!(analysis.fens.len(), analysis.moves.len() + 1);
}

#[test]
#[ignore = "requires Stockfish"]
fn test_opera_game_review() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    let factory = UciEngineFactory::new("stockfish", EngineSettings::default());
    let analyzer = GameAnalyzer::new(factory, fast_config());
    let analysis = analyzer.analyze_pgn(OPERA_GAME_PGN).expect("Failed to analyze game");

    assert_eq!(analysis.moves.len(), 33);
    assert_eq!(analysis.evals.len(), 34);
    assert_eq!(analysis.game_info.black, "Duke Karl / Count Isouard");
    assert!(analysis.white_stats.avg_cp_loss < analysis.black_stats.avg_cp_loss);
}

#[test]
#[ignore = "requires Stockfish"]
fn test_live_game_round_trip() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    let factory = UciEngineFactory::new("stockfish", EngineSettings::default());
    let coach = LiveCoach::new(factory, fast_config());

    let (mut game, update) = coach.start(Color::Black).expect("start failed");
    assert!(update.engine_move.is_some());
    assert_eq!(game.moves_uci.len(), 1);

    let hint = coach.hint(&game).expect("hint failed");
    let feedback = coach.play_move(&mut game, &hint.best_move_uci).expect("move failed");
    assert!(feedback.classification.is_some());
    assert_eq!(game.moves_uci.len(), 3);

    coach.undo(&mut game).expect("undo failed");
    assert_eq!(game.moves_uci.len(), 1);
    assert_eq!(LiveGame::fen(&game).ok(), Some(update.fen));
}
