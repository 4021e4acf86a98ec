//! Opening practice: checks a student's moves against a curated line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotate::AnnotatedLine;
use crate::book::OpeningBook;

/// Shown when the student has played every move of the line.
pub const COMPLETED_MESSAGE: &str = "Congratulations! You've completed this opening!";

/// Errors that can occur when looking up a practice line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrainerError {
    #[error("opening not found: {0}")]
    UnknownOpening(String),

    #[error("opening '{opening}' has no line {line}")]
    UnknownLine { opening: String, line: usize },
}

/// Verdict on a move the student played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCheck {
    pub correct: bool,
    /// The line was already finished before this move.
    pub completed: bool,
    pub expected_move: Option<String>,
    pub comment: Option<String>,
    /// Feedback for a miss or for completing the line.
    pub message: Option<String>,
}

/// The move the line plays next, e.g. the reply for the opponent side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextMove {
    pub completed: bool,
    pub san: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
}

/// Practice service over an [`OpeningBook`].
#[derive(Debug, Clone, Copy)]
pub struct OpeningTrainer<'a> {
    book: &'a OpeningBook,
}

impl<'a> OpeningTrainer<'a> {
    pub fn new(book: &'a OpeningBook) -> Self {
        Self { book }
    }

    fn line(&self, opening: &str, line: usize) -> Result<&'a AnnotatedLine, TrainerError> {
        let found = self
            .book
            .opening(opening)
            .ok_or_else(|| TrainerError::UnknownOpening(opening.to_string()))?;
        found.lines.get(line).ok_or_else(|| TrainerError::UnknownLine {
            opening: opening.to_string(),
            line,
        })
    }

    /// Compares `san` with the move at `move_index` of the line.
    ///
    /// The comparison is exact, so check suffixes must match the data.
    pub fn check_move(
        &self,
        opening: &str,
        line: usize,
        move_index: usize,
        san: &str,
    ) -> Result<MoveCheck, TrainerError> {
        let line = self.line(opening, line)?;
        let Some(expected) = line.moves.get(move_index) else {
            return Ok(MoveCheck {
                correct: true,
                completed: true,
                expected_move: None,
                comment: None,
                message: Some(COMPLETED_MESSAGE.to_string()),
            });
        };

        let correct = san.trim() == expected.san;
        let message = (!correct).then(|| format!("Not quite! The correct move is {}", expected.san));
        Ok(MoveCheck {
            correct,
            completed: false,
            expected_move: Some(expected.san.clone()),
            comment: Some(expected.comment.clone()),
            message,
        })
    }

    /// The move at `move_index`, or `completed` once the line is exhausted.
    pub fn next_move(&self, opening: &str, line: usize, move_index: usize) -> Result<NextMove, TrainerError> {
        let line = self.line(opening, line)?;
        Ok(match line.moves.get(move_index) {
            Some(mv) => NextMove {
                completed: false,
                san: Some(mv.san.clone()),
                description: Some(mv.description.clone()),
                comment: Some(mv.comment.clone()),
            },
            None => NextMove {
                completed: true,
                san: None,
                description: None,
                comment: None,
            },
        })
    }
}
