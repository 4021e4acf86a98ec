//! Move quality classification and game analysis records.

use std::fmt;

use chess_core::Color;
use serde::{Deserialize, Serialize};

use crate::rules::GameHeaders;

/// Classification of move quality based on centipawn loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveQuality {
    /// Scored better than the engine expected before the move
    Brilliant,
    /// The best move in the position, or equivalent
    Best,
    /// Excellent move (minimal centipawn loss)
    Excellent,
    /// Good move (small centipawn loss)
    Good,
    /// Inaccuracy (noticeable centipawn loss)
    Inaccuracy,
    /// Mistake (significant centipawn loss)
    Mistake,
    /// Blunder (major centipawn loss)
    Blunder,
}

impl MoveQuality {
    /// All labels from best to worst.
    pub const ALL: [MoveQuality; 7] = [
        MoveQuality::Brilliant,
        MoveQuality::Best,
        MoveQuality::Excellent,
        MoveQuality::Good,
        MoveQuality::Inaccuracy,
        MoveQuality::Mistake,
        MoveQuality::Blunder,
    ];

    /// Grades a centipawn loss measured from the mover's point of view.
    ///
    /// | loss | label |
    /// |---|---|
    /// | < -50 | Brilliant |
    /// | -50..=20 | Best |
    /// | 21..=50 | Excellent |
    /// | 51..=100 | Good |
    /// | 101..=200 | Inaccuracy |
    /// | 201..=400 | Mistake |
    /// | > 400 | Blunder |
    pub const fn from_cp_loss(cp_loss: i32) -> Self {
        match cp_loss {
            i32::MIN..=-51 => MoveQuality::Brilliant,
            -50..=20 => MoveQuality::Best,
            21..=50 => MoveQuality::Excellent,
            51..=100 => MoveQuality::Good,
            101..=200 => MoveQuality::Inaccuracy,
            201..=400 => MoveQuality::Mistake,
            _ => MoveQuality::Blunder,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            MoveQuality::Brilliant => "Brilliant",
            MoveQuality::Best => "Best",
            MoveQuality::Excellent => "Excellent",
            MoveQuality::Good => "Good",
            MoveQuality::Inaccuracy => "Inaccuracy",
            MoveQuality::Mistake => "Mistake",
            MoveQuality::Blunder => "Blunder",
        }
    }

    /// True for inaccuracies, mistakes and blunders.
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            MoveQuality::Inaccuracy | MoveQuality::Mistake | MoveQuality::Blunder
        )
    }
}

impl fmt::Display for MoveQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Centipawn loss of a move: the mover's evaluation before minus after.
///
/// `None` when either evaluation is unavailable.
pub fn centipawn_loss(before: Option<i32>, after: Option<i32>) -> Option<i32> {
    Some(before?.saturating_sub(after?))
}

/// Analysis result for a single ply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlyAnalysisRecord {
    /// Full move number the ply belongs to
    pub move_number: u32,
    /// The side that moved
    pub side: Color,
    /// The move played, in SAN
    pub san: String,
    /// The engine's preferred move before the ply, in SAN, or "N/A"
    pub best_san: String,
    /// Mover's evaluation before the move
    pub eval_before: Option<i32>,
    /// Mover's evaluation after the move
    pub eval_after: Option<i32>,
    /// Centipawn loss from playing this move
    pub cp_loss: Option<i32>,
    /// Quality classification
    pub classification: Option<MoveQuality>,
}

/// Statistics for a player's performance in a game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Total moves played
    pub total_moves: u32,
    /// Moves that could be graded
    pub graded_moves: u32,
    /// Number of brilliant moves
    pub brilliant_moves: u32,
    /// Number of best moves
    pub best_moves: u32,
    /// Number of excellent moves
    pub excellent_moves: u32,
    /// Number of good moves
    pub good_moves: u32,
    /// Number of inaccuracies
    pub inaccuracies: u32,
    /// Number of mistakes
    pub mistakes: u32,
    /// Number of blunders
    pub blunders: u32,
    /// Average centipawn loss over graded moves, negative losses counted as zero
    pub avg_cp_loss: f64,
}

impl PlayerStats {
    /// Aggregates the records of one side.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PlyAnalysisRecord>) -> Self {
        let mut stats = Self::default();
        let mut total_loss: i64 = 0;

        for record in records {
            stats.total_moves += 1;
            let (Some(loss), Some(quality)) = (record.cp_loss, record.classification) else {
                continue;
            };
            stats.graded_moves += 1;
            total_loss += i64::from(loss.max(0));
            match quality {
                MoveQuality::Brilliant => stats.brilliant_moves += 1,
                MoveQuality::Best => stats.best_moves += 1,
                MoveQuality::Excellent => stats.excellent_moves += 1,
                MoveQuality::Good => stats.good_moves += 1,
                MoveQuality::Inaccuracy => stats.inaccuracies += 1,
                MoveQuality::Mistake => stats.mistakes += 1,
                MoveQuality::Blunder => stats.blunders += 1,
            }
        }

        if stats.graded_moves > 0 {
            stats.avg_cp_loss = total_loss as f64 / f64::from(stats.graded_moves);
        }
        stats
    }

    /// Number of moves graded with `quality`.
    pub fn count(&self, quality: MoveQuality) -> u32 {
        match quality {
            MoveQuality::Brilliant => self.brilliant_moves,
            MoveQuality::Best => self.best_moves,
            MoveQuality::Excellent => self.excellent_moves,
            MoveQuality::Good => self.good_moves,
            MoveQuality::Inaccuracy => self.inaccuracies,
            MoveQuality::Mistake => self.mistakes,
            MoveQuality::Blunder => self.blunders,
        }
    }
}

/// Complete analysis of a chess game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAnalysis {
    /// Game metadata from the PGN tags
    pub game_info: GameHeaders,
    /// Analysis of each ply
    pub moves: Vec<PlyAnalysisRecord>,
    /// FEN of the initial position and after every ply
    pub fens: Vec<String>,
    /// White's evaluation of the initial position and after every ply
    pub evals: Vec<Option<i32>>,
    /// "1. e4", "1... e5", ... one per ply
    pub move_labels: Vec<String>,
    /// Statistics for white
    pub white_stats: PlayerStats,
    /// Statistics for black
    pub black_stats: PlayerStats,
}
