//! Line annotation: expands curated SAN lines into from/to moves for display.

use chess_core::{Piece, Square};
use chess_replay::{MoveResolver, ResolveError, ResolvedMove};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::opening::Line;

/// A curated line contains a move the replay cannot resolve.
///
/// This means the opening data itself is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("opening '{opening}' line {line} ('{line_name}'), ply {ply}: {source}")]
pub struct AnnotateError {
    pub opening: String,
    pub line: usize,
    pub line_name: String,
    /// Zero-based index of the failing move.
    pub ply: usize,
    #[source]
    pub source: ResolveError,
}

/// A curated move with its resolved squares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedMove {
    pub san: String,
    pub comment: String,
    pub piece: Piece,
    pub from_square: Square,
    pub to_square: Square,
    /// e.g. `"Knight g1 -> f3"`.
    pub description: String,
}

impl From<ResolvedMove> for AnnotatedMove {
    fn from(mv: ResolvedMove) -> Self {
        let description = mv.description();
        Self {
            san: mv.san,
            comment: mv.comment,
            piece: mv.piece,
            from_square: mv.from_square,
            to_square: mv.to_square,
            description,
        }
    }
}

/// A line with every move annotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedLine {
    pub name: String,
    pub moves: Vec<AnnotatedMove>,
    /// Piece placement after the last move, in FEN notation.
    pub final_placement: String,
}

impl AnnotatedLine {
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Replays `line` from the starting position, White first.
///
/// `opening` and `index` only label errors.
pub fn annotate_line(opening: &str, index: usize, line: &Line) -> Result<AnnotatedLine, AnnotateError> {
    let mut resolver = MoveResolver::new();
    let mut moves = Vec::with_capacity(line.len());

    for (ply, token) in line.moves.iter().enumerate() {
        let resolved = resolver
            .resolve(&token.san, &token.comment)
            .map_err(|source| AnnotateError {
                opening: opening.to_string(),
                line: index,
                line_name: line.name.clone(),
                ply,
                source,
            })?;
        moves.push(AnnotatedMove::from(resolved));
    }

    Ok(AnnotatedLine {
        name: line.name.clone(),
        moves,
        final_placement: resolver.board().placement(),
    })
}
