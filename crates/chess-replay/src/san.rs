//! SAN move token parsing.
//!
//! Only the subset of SAN that curated study lines use is understood:
//! piece moves with optional disambiguation, pawn pushes and captures, and
//! castling. Examples: "e4", "Nf3", "Bxc6", "O-O", "Nbd2", "R1e1".

use std::fmt;

use chess_core::{File, Piece, Rank, Square};

use crate::ResolveError;

/// Which side of the board a castling move goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub const fn notation(self) -> &'static str {
        match self {
            CastleSide::King => "O-O",
            CastleSide::Queen => "O-O-O",
        }
    }
}

/// Parsed components of a SAN move token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanToken {
    Castle(CastleSide),
    Piece {
        kind: Piece,
        from_file: Option<File>,
        from_rank: Option<Rank>,
        capture: bool,
        to: Square,
    },
    Pawn {
        from_file: Option<File>,
        capture: bool,
        to: Square,
    },
}

impl SanToken {
    /// Parses a SAN token.
    ///
    /// Trailing check, mate and annotation glyphs (`+ # ! ?`) are ignored.
    /// Promotions are rejected.
    pub fn parse(token: &str) -> Result<Self, ResolveError> {
        let san = strip_decorations(token);
        if san.is_empty() {
            return Err(invalid(token, "empty token"));
        }

        match san {
            "O-O" | "0-0" => return Ok(SanToken::Castle(CastleSide::King)),
            "O-O-O" | "0-0-0" => return Ok(SanToken::Castle(CastleSide::Queen)),
            _ => {}
        }

        if !san.is_ascii() {
            return Err(invalid(token, "non-ASCII characters"));
        }
        if san.contains('=') {
            return Err(invalid(token, "promotion is not supported"));
        }

        let mut chars = san.chars();
        let first = chars.next().unwrap_or_default();
        let (kind, body) = match Piece::from_san_letter(first) {
            Some(kind) => (Some(kind), chars.as_str()),
            None if first.is_ascii_uppercase() => {
                return Err(invalid(token, &format!("unknown piece letter '{}'", first)));
            }
            None => (None, san),
        };

        let capture = body.contains('x');
        let (hint, dest) = match body.split_once('x') {
            Some((hint, dest)) => (hint, dest),
            None if body.len() >= 2 => body.split_at(body.len() - 2),
            None => return Err(invalid(token, "too short")),
        };
        let to = Square::from_algebraic(dest)
            .ok_or_else(|| invalid(token, &format!("invalid destination '{}'", dest)))?;

        match kind {
            Some(kind) => {
                let (from_file, from_rank) = parse_disambiguation(hint)
                    .ok_or_else(|| invalid(token, &format!("invalid disambiguation '{}'", hint)))?;
                Ok(SanToken::Piece {
                    kind,
                    from_file,
                    from_rank,
                    capture,
                    to,
                })
            }
            None => {
                let from_file = match (capture, hint) {
                    (false, "") => None,
                    (true, hint) => {
                        let mut hint_chars = hint.chars();
                        match (hint_chars.next().and_then(File::from_char), hint_chars.next()) {
                            (Some(file), None) => Some(file),
                            _ => {
                                return Err(invalid(
                                    token,
                                    "pawn capture needs a single origin file",
                                ))
                            }
                        }
                    }
                    (false, _) => return Err(invalid(token, "unexpected characters")),
                };
                Ok(SanToken::Pawn {
                    from_file,
                    capture,
                    to,
                })
            }
        }
    }

    /// Piece kind that makes this move.
    pub const fn piece(&self) -> Piece {
        match self {
            SanToken::Castle(_) => Piece::King,
            SanToken::Piece { kind, .. } => *kind,
            SanToken::Pawn { .. } => Piece::Pawn,
        }
    }

    /// Destination square, `None` for castling since it depends on the color.
    pub const fn destination(&self) -> Option<Square> {
        match self {
            SanToken::Castle(_) => None,
            SanToken::Piece { to, .. } | SanToken::Pawn { to, .. } => Some(*to),
        }
    }

    pub const fn is_capture(&self) -> bool {
        match self {
            SanToken::Castle(_) => false,
            SanToken::Piece { capture, .. } | SanToken::Pawn { capture, .. } => *capture,
        }
    }
}

impl fmt::Display for SanToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SanToken::Castle(side) => f.write_str(side.notation()),
            SanToken::Piece {
                kind,
                from_file,
                from_rank,
                capture,
                to,
            } => {
                if let Some(letter) = kind.san_letter() {
                    write!(f, "{}", letter)?;
                }
                if let Some(file) = from_file {
                    write!(f, "{}", file)?;
                }
                if let Some(rank) = from_rank {
                    write!(f, "{}", rank)?;
                }
                if capture {
                    f.write_str("x")?;
                }
                write!(f, "{}", to)
            }
            SanToken::Pawn {
                from_file,
                capture,
                to,
            } => {
                if let Some(file) = from_file {
                    write!(f, "{}", file)?;
                }
                if capture {
                    f.write_str("x")?;
                }
                write!(f, "{}", to)
            }
        }
    }
}

fn strip_decorations(token: &str) -> &str {
    token
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'))
}

/// Parses a 0-2 character origin hint such as `"b"`, `"1"` or `"d4"`.
fn parse_disambiguation(s: &str) -> Option<(Option<File>, Option<Rank>)> {
    let chars: Vec<char> = s.chars().collect();
    match chars.as_slice() {
        [] => Some((None, None)),
        [c] => match (File::from_char(*c), Rank::from_char(*c)) {
            (Some(file), _) => Some((Some(file), None)),
            (None, Some(rank)) => Some((None, Some(rank))),
            (None, None) => None,
        },
        [f, r] => Some((Some(File::from_char(*f)?), Some(Rank::from_char(*r)?))),
        _ => None,
    }
}

fn invalid(token: &str, reason: &str) -> ResolveError {
    ResolveError::InvalidToken {
        token: token.to_string(),
        reason: reason.to_string(),
    }
}
