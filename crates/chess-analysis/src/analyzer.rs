//! Game analysis with move quality classification.
//!
//! This module provides the [`GameAnalyzer`] for reviewing complete games
//! and classifying each move's quality.

use std::time::Duration;

use chess_core::Color;
use thiserror::Error;
use tracing::{info, warn};

use crate::engine::{AnalysisEngine, EngineError, EngineFactory, PositionAnalysis, SearchLimit};
use crate::evaluation::Evaluation;
use crate::quality::{centipawn_loss, GameAnalysis, MoveQuality, PlayerStats, PlyAnalysisRecord};
use crate::rules::{parse_pgn, Board, GameRecord, RulesError};

/// Errors that can occur during game analysis.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The game record could not be parsed or replayed.
    #[error("Invalid game: {0}")]
    Rules(#[from] RulesError),
    /// Error from the analysis engine.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Search budgets for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Budget for post-game review and hints.
    pub analysis_limit: SearchLimit,
    /// Budget while a live game is being played.
    pub live_limit: SearchLimit,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analysis_limit: SearchLimit::MoveTime(Duration::from_millis(500)),
            live_limit: SearchLimit::MoveTime(Duration::from_millis(100)),
        }
    }
}

/// Analyzes chess games to classify move quality.
///
/// Every call acquires its own engine from the factory and releases it
/// before returning, whether the analysis succeeded or not.
#[derive(Debug, Clone)]
pub struct GameAnalyzer<F> {
    factory: F,
    config: AnalysisConfig,
}

impl<F: EngineFactory> GameAnalyzer<F> {
    pub fn new(factory: F, config: AnalysisConfig) -> Self {
        Self { factory, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Parses `pgn` and grades every mainline move.
    ///
    /// # Errors
    ///
    /// A PGN that does not parse fails before any engine is started. Engine
    /// failures abort the whole analysis; there is no partial result.
    pub fn analyze_pgn(&self, pgn: &str) -> Result<GameAnalysis, AnalyzerError> {
        let record = parse_pgn(pgn)?;
        info!(
            white = %record.headers.white,
            black = %record.headers.black,
            plies = record.len(),
            "analyzing game"
        );

        let mut engine = self.factory.acquire()?;
        engine.new_game()?;
        let analysis = analyze_game(&mut engine, &record, self.config.analysis_limit)?;

        info!(
            white_avg_cp_loss = analysis.white_stats.avg_cp_loss,
            black_avg_cp_loss = analysis.black_stats.avg_cp_loss,
            "analysis complete"
        );
        Ok(analysis)
    }
}

/// The mover's evaluation of one position, if the engine scored it.
pub(crate) fn mover_eval(analysis: &PositionAnalysis, native: Color, mover: Color) -> Option<Evaluation> {
    analysis
        .score
        .map(|score| Evaluation::from_score(score, native, mover))
}

/// Mover's-perspective evaluations around one ply and the resulting grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlyGrade {
    pub eval_before: Option<i32>,
    pub eval_after: Option<i32>,
    pub cp_loss: Option<i32>,
    pub classification: Option<MoveQuality>,
}

/// Grades one ply from the engine's view of the positions before and after it.
///
/// `before` is scored for the mover, `after` for the opponent.
pub(crate) fn grade_ply(before: &PositionAnalysis, after: &PositionAnalysis, mover: Color) -> PlyGrade {
    let eval_before = mover_eval(before, mover, mover).map(|e| e.to_centipawns());
    let eval_after = mover_eval(after, mover.opposite(), mover).map(|e| e.to_centipawns());
    let cp_loss = centipawn_loss(eval_before, eval_after);
    PlyGrade {
        eval_before,
        eval_after,
        cp_loss,
        classification: cp_loss.map(MoveQuality::from_cp_loss),
    }
}

/// Runs the per-ply review of `record` on an already prepared engine.
pub fn analyze_game<E: AnalysisEngine>(
    engine: &mut E,
    record: &GameRecord,
    limit: SearchLimit,
) -> Result<GameAnalysis, EngineError> {
    let mut board = Board::new();
    let mut moves = Vec::with_capacity(record.len());
    let mut fens = Vec::with_capacity(record.len() + 1);
    let mut evals = Vec::with_capacity(record.len() + 1);
    let mut move_labels = Vec::with_capacity(record.len());

    fens.push(board.fen());

    for (ply, mv) in record.moves.iter().enumerate() {
        let mover = board.turn();
        let move_number = board.fullmove_number();
        let san = board.san(mv);

        let before = engine.analyse(&board.fen(), limit)?;
        if ply == 0 {
            evals.push(mover_eval(&before, mover, Color::White).map(|e| e.to_centipawns()));
        }
        let best_san = before
            .best_line_move()
            .map(|uci| board.uci_to_san(uci))
            .unwrap_or_else(|| "N/A".to_string());

        board.play(mv);
        let fen = board.fen();
        let after = engine.analyse(&fen, limit)?;

        let grade = grade_ply(&before, &after, mover);
        if grade.classification.is_none() {
            warn!(ply = ply + 1, san = %san, "no engine score, move left ungraded");
        }

        evals.push(mover_eval(&after, mover.opposite(), Color::White).map(|e| e.to_centipawns()));
        move_labels.push(match mover {
            Color::White => format!("{move_number}. {san}"),
            Color::Black => format!("{move_number}... {san}"),
        });
        fens.push(fen);
        moves.push(PlyAnalysisRecord {
            move_number,
            side: mover,
            san,
            best_san,
            eval_before: grade.eval_before,
            eval_after: grade.eval_after,
            cp_loss: grade.cp_loss,
            classification: grade.classification,
        });
    }

    let white_stats = PlayerStats::from_records(moves.iter().filter(|m| m.side == Color::White));
    let black_stats = PlayerStats::from_records(moves.iter().filter(|m| m.side == Color::Black));

    Ok(GameAnalysis {
        game_info: record.headers.clone(),
        moves,
        fens,
        evals,
        move_labels,
        white_stats,
        black_stats,
    })
}
