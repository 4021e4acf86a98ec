//! Engine-backed game review and live play.
//!
//! This crate grades chess moves by comparing engine evaluations before
//! and after each move.
//!
//! # Overview
//!
//! - [`Score`] / [`Evaluation`] - Raw engine scores and their point-of-view normalization
//! - [`MoveQuality`] - Classification of move quality from centipawn loss
//! - [`UciEngine`] - Wrapper for UCI analysis engines like Stockfish
//! - [`GameAnalyzer`] - Reviews complete PGN games
//! - [`LiveCoach`] - Plays graded games against the engine
//!
//! # Example
//!
//! ```no_run
//! use chess_analysis::{AnalysisConfig, EngineSettings, GameAnalyzer, UciEngineFactory};
//! use chess_analysis::sample::OPERA_GAME_PGN;
//!
//! let factory = UciEngineFactory::new("stockfish", EngineSettings::default());
//! let analyzer = GameAnalyzer::new(factory, AnalysisConfig::default());
//! let analysis = analyzer.analyze_pgn(OPERA_GAME_PGN)?;
//! println!("White average loss: {:.1}", analysis.white_stats.avg_cp_loss);
//! # Ok::<(), chess_analysis::AnalyzerError>(())
//! ```

pub mod analyzer;
pub mod engine;
pub mod evaluation;
pub mod live;
pub mod quality;
pub mod rules;
pub mod sample;

pub use analyzer::{analyze_game, AnalysisConfig, AnalyzerError, GameAnalyzer};
pub use engine::{
    AnalysisEngine, EngineError, EngineFactory, EngineSettings, PositionAnalysis, SearchLimit,
    UciEngine, UciEngineFactory,
};
pub use evaluation::{Evaluation, Score, MATE_SCORE};
pub use live::{Hint, LiveCoach, LiveError, LiveGame, MoveFeedback, PositionUpdate};
pub use quality::{centipawn_loss, GameAnalysis, MoveQuality, PlayerStats, PlyAnalysisRecord};
pub use rules::{parse_pgn, Board, GameHeaders, GameRecord, RulesError, STARTING_FEN};
