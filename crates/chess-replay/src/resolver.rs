//! Resolution of SAN tokens into concrete moves on a replay board.

use chess_core::{Color, Piece, Square};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::geometry::{pawn_captures, pawn_pushes, piece_reaches};
use crate::san::{CastleSide, SanToken};
use crate::Board;

/// Error type for move resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The token is not SAN this resolver understands.
    #[error("invalid move token '{token}': {reason}")]
    InvalidToken { token: String, reason: String },

    /// No piece of the side to move can make the move.
    #[error("no {color} {piece} can play '{token}' to {to}")]
    NoCandidate {
        token: String,
        color: Color,
        piece: Piece,
        to: Square,
    },

    /// More than one piece matches and the token does not say which.
    #[error("'{token}' is ambiguous for {color}: pieces on {candidates:?} can all move there")]
    Ambiguous {
        token: String,
        color: Color,
        candidates: Vec<Square>,
    },
}

/// A move token resolved to its origin and destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMove {
    /// Kind of piece that moved (King for castling).
    pub piece: Piece,
    pub from_square: Square,
    pub to_square: Square,
    /// The token as given, decorations included.
    pub san: String,
    pub comment: String,
}

impl ResolvedMove {
    /// Human readable form, e.g. `"Knight g1 -> f3"`.
    pub fn description(&self) -> String {
        format!("{} {} -> {}", self.piece, self.from_square, self.to_square)
    }
}

/// King and rook relocation for one castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleSquares {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

/// Fixed castling squares for a color and side.
pub const fn castling_squares(color: Color, side: CastleSide) -> CastleSquares {
    match (color, side) {
        (Color::White, CastleSide::King) => CastleSquares {
            king_from: Square::E1,
            king_to: Square::G1,
            rook_from: Square::H1,
            rook_to: Square::F1,
        },
        (Color::White, CastleSide::Queen) => CastleSquares {
            king_from: Square::E1,
            king_to: Square::C1,
            rook_from: Square::A1,
            rook_to: Square::D1,
        },
        (Color::Black, CastleSide::King) => CastleSquares {
            king_from: Square::E8,
            king_to: Square::G8,
            rook_from: Square::H8,
            rook_to: Square::F8,
        },
        (Color::Black, CastleSide::Queen) => CastleSquares {
            king_from: Square::E8,
            king_to: Square::C8,
            rook_from: Square::A8,
            rook_to: Square::D8,
        },
    }
}

/// Replays SAN tokens on its own board, alternating the side to move.
#[derive(Debug, Clone)]
pub struct MoveResolver {
    board: Board,
    side_to_move: Color,
}

impl MoveResolver {
    /// Starts from the standard position with White to move.
    pub fn new() -> Self {
        Self::from_position(Board::starting_position(), Color::White)
    }

    pub fn from_position(board: Board, side_to_move: Color) -> Self {
        Self {
            board,
            side_to_move,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Resolves one token for the side to move, applies it and passes the
    /// turn. On error the board is left untouched.
    pub fn resolve(&mut self, san: &str, comment: &str) -> Result<ResolvedMove, ResolveError> {
        let color = self.side_to_move;
        let token = SanToken::parse(san)?;

        let (from, to) = match token {
            SanToken::Castle(side) => {
                let squares = castling_squares(color, side);
                self.board.remove(squares.king_from);
                self.board.remove(squares.rook_from);
                self.board.place(squares.king_to, color, Piece::King);
                self.board.place(squares.rook_to, color, Piece::Rook);
                (squares.king_from, squares.king_to)
            }
            SanToken::Piece { to, .. } | SanToken::Pawn { to, .. } => {
                let from = self.find_origin(&token, san, color, to)?;
                self.board.move_piece(from, to);
                (from, to)
            }
        };

        let resolved = ResolvedMove {
            piece: token.piece(),
            from_square: from,
            to_square: to,
            san: san.to_string(),
            comment: comment.to_string(),
        };
        debug!(san, color = %color, from = %from, to = %to, "resolved move");

        self.side_to_move = color.opposite();
        Ok(resolved)
    }

    /// Resolves a whole sequence of `(san, comment)` pairs, stopping at the
    /// first failure.
    pub fn resolve_line<I, S, C>(&mut self, moves: I) -> Result<Vec<ResolvedMove>, ResolveError>
    where
        I: IntoIterator<Item = (S, C)>,
        S: AsRef<str>,
        C: AsRef<str>,
    {
        moves
            .into_iter()
            .map(|(san, comment)| self.resolve(san.as_ref(), comment.as_ref()))
            .collect()
    }

    fn find_origin(
        &self,
        token: &SanToken,
        san: &str,
        color: Color,
        to: Square,
    ) -> Result<Square, ResolveError> {
        let candidates: Vec<Square> = match *token {
            SanToken::Piece {
                kind,
                from_file,
                from_rank,
                ..
            } => {
                if self.board.occupant(to).is_some_and(|occ| occ.color == color) {
                    Vec::new()
                } else {
                    self.board
                        .pieces()
                        .filter(|(_, occ)| occ.color == color && occ.piece == kind)
                        .map(|(sq, _)| sq)
                        .filter(|sq| from_file.map_or(true, |f| sq.file() == f))
                        .filter(|sq| from_rank.map_or(true, |r| sq.rank() == r))
                        .filter(|&sq| piece_reaches(&self.board, kind, sq, to))
                        .collect()
                }
            }
            SanToken::Pawn {
                from_file, capture, ..
            } => self
                .board
                .pieces()
                .filter(|(_, occ)| occ.color == color && occ.piece == Piece::Pawn)
                .map(|(sq, _)| sq)
                .filter(|sq| from_file.map_or(true, |f| sq.file() == f))
                .filter(|&sq| {
                    if capture {
                        pawn_captures(&self.board, color, sq, to)
                    } else {
                        pawn_pushes(&self.board, color, sq, to)
                    }
                })
                .collect(),
            SanToken::Castle(_) => Vec::new(),
        };

        match candidates.as_slice() {
            [from] => Ok(*from),
            [] => Err(ResolveError::NoCandidate {
                token: san.to_string(),
                color,
                piece: token.piece(),
                to,
            }),
            _ => Err(ResolveError::Ambiguous {
                token: san.to_string(),
                color,
                candidates,
            }),
        }
    }
}

impl Default for MoveResolver {
    fn default() -> Self {
        Self::new()
    }
}
