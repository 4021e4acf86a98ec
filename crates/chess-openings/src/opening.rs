//! Core opening types and structures.

use chess_core::Color;
use serde::{Deserialize, Serialize};

/// A single SAN move of a curated line with its commentary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveToken {
    /// The move in SAN (e.g., "Nf3", "O-O").
    pub san: String,
    /// Explanation shown to the student.
    #[serde(default)]
    pub comment: String,
}

/// One variation of an opening, starting from the initial position with
/// White to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// The variation name (e.g., "Main Line").
    pub name: String,
    /// Moves in play order, sides alternating.
    pub moves: Vec<MoveToken>,
}

/// Represents a named chess opening and its curated lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    /// Unique identifier (e.g., "italian-game").
    pub id: String,
    /// The name of the opening.
    pub name: String,
    /// The side the student practises.
    pub side: Color,
    /// The ECO code for this opening (e.g., "C50").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eco: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Variations, the first being the main line.
    pub lines: Vec<Line>,
}

impl MoveToken {
    #[must_use]
    pub fn new(san: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            san: san.into(),
            comment: comment.into(),
        }
    }
}

impl Line {
    /// Creates a new line with the given name and moves.
    #[must_use]
    pub fn new(name: impl Into<String>, moves: Vec<MoveToken>) -> Self {
        Self {
            name: name.into(),
            moves,
        }
    }

    /// Builds a line from bare SAN tokens without commentary.
    #[must_use]
    pub fn from_san(name: impl Into<String>, sans: &[&str]) -> Self {
        Self::new(
            name,
            sans.iter().map(|san| MoveToken::new(*san, "")).collect(),
        )
    }

    /// Returns the number of moves (plies) in the line.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The side that plays the move at `index`.
    #[must_use]
    pub fn side_at(index: usize) -> Color {
        if index % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }
}

impl Opening {
    /// Creates a new opening without lines.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, side: Color) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            side,
            eco: None,
            description: String::new(),
            lines: Vec::new(),
        }
    }

    /// Sets the ECO code for this opening.
    #[must_use]
    pub fn with_eco(mut self, eco: impl Into<String>) -> Self {
        self.eco = Some(eco.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a line.
    #[must_use]
    pub fn with_line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    /// The first (main) line, if any.
    #[must_use]
    pub fn main_line(&self) -> Option<&Line> {
        self.lines.first()
    }
}
