//! Adapter over the `shakmaty` rules library: PGN parsing, legal move
//! application, SAN/UCI conversion and terminal status.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{Chess, EnPassantMode, Move, Position};
use thiserror::Error;

use chess_core::Color;

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors from parsing games or applying moves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("invalid PGN: {0}")]
    InvalidPgn(String),

    #[error("illegal move '{mv}' at ply {ply}")]
    IllegalMove { ply: usize, mv: String },

    #[error("invalid UCI move: {0}")]
    InvalidUci(String),
}

/// PGN tag pairs the analysis reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHeaders {
    pub white: String,
    pub black: String,
    pub event: String,
    pub site: String,
    pub date: String,
    pub result: String,
}

impl Default for GameHeaders {
    fn default() -> Self {
        Self {
            white: "Unknown".to_string(),
            black: "Unknown".to_string(),
            event: "Unknown Event".to_string(),
            site: String::new(),
            date: String::new(),
            result: "*".to_string(),
        }
    }
}

impl GameHeaders {
    fn set(&mut self, tag: &str, value: &str) {
        let slot = match tag {
            "White" => &mut self.white,
            "Black" => &mut self.black,
            "Event" => &mut self.event,
            "Site" => &mut self.site,
            "Date" => &mut self.date,
            "Result" => &mut self.result,
            _ => return,
        };
        *slot = value.to_string();
    }
}

/// A parsed game: headers plus the legal mainline.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub headers: GameHeaders,
    /// Mainline moves, each legal in the position it is played from.
    pub moves: Vec<Move>,
    /// SAN of each move as this library renders it (check suffixes included).
    pub sans: Vec<String>,
}

impl GameRecord {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

struct PgnPatterns {
    tag: Regex,
    comment: Regex,
    variation: Regex,
    line_comment: Regex,
    nag: Regex,
    move_number: Regex,
    result: Regex,
    san: Regex,
}

fn patterns() -> Result<&'static PgnPatterns, RulesError> {
    static PATTERNS: OnceLock<Result<PgnPatterns, String>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            let build = |re: &str| Regex::new(re).map_err(|e| e.to_string());
            Ok(PgnPatterns {
                tag: build(r#"^\s*\[(\w+)\s+"((?:[^"\\]|\\.)*)"\s*\]\s*$"#)?,
                comment: build(r"\{[^}]*\}")?,
                variation: build(r"\([^()]*\)")?,
                line_comment: build(r"(?m);.*$")?,
                nag: build(r"\$\d+")?,
                move_number: build(r"\d+\.(\.\.)?")?,
                result: build(r"^(1-0|0-1|1/2-1/2|\*)$")?,
                san: build(
                    r"^(O-O(-O)?|0-0(-0)?|[KQRBN][a-h]?[1-8]?x?[a-h][1-8]|[a-h](x[a-h])?[1-8](=?[QRBN])?)[+#]?[!?]*$",
                )?,
            })
        })
        .as_ref()
        .map_err(|e| RulesError::InvalidPgn(format!("pattern error: {e}")))
}

/// Parses the first game of a PGN document and replays its mainline.
///
/// Comments, variations, NAGs, move numbers and the result token are
/// discarded. Anything else that is not a SAN move makes the whole record
/// invalid; so does an empty movetext.
pub fn parse_pgn(pgn: &str) -> Result<GameRecord, RulesError> {
    let patterns = patterns()?;
    let mut headers = GameHeaders::default();
    let mut movetext = String::new();

    let mut in_comment = false;

    for line in pgn.lines() {
        if !in_comment && line.trim_start().starts_with('[') {
            // A tag section after movetext starts the next game.
            if !movetext.trim().is_empty() {
                break;
            }
            let caps = patterns
                .tag
                .captures(line)
                .ok_or_else(|| RulesError::InvalidPgn(format!("malformed tag: {}", line.trim())))?;
            headers.set(&caps[1], &caps[2].replace("\\\"", "\""));
            continue;
        }
        in_comment = comment_open_after(line, in_comment);
        movetext.push_str(line);
        movetext.push('\n');
    }

    let movetext = patterns.line_comment.replace_all(&movetext, " ");
    let mut movetext = patterns.comment.replace_all(&movetext, " ").into_owned();
    while patterns.variation.is_match(&movetext) {
        movetext = patterns.variation.replace_all(&movetext, " ").into_owned();
    }
    let movetext = patterns.nag.replace_all(&movetext, " ");
    let movetext = patterns.move_number.replace_all(&movetext, " ");

    let mut board = Board::new();
    let mut moves = Vec::new();
    let mut sans = Vec::new();

    for token in movetext.split_whitespace() {
        if patterns.result.is_match(token) {
            continue;
        }
        if !patterns.san.is_match(token) {
            return Err(RulesError::InvalidPgn(format!("unexpected token '{token}'")));
        }
        let ply = moves.len() + 1;
        let mv = board.parse_san(token).map_err(|_| RulesError::IllegalMove {
            ply,
            mv: token.to_string(),
        })?;
        sans.push(board.san(&mv));
        board.play(&mv);
        moves.push(mv);
    }

    if moves.is_empty() {
        return Err(RulesError::InvalidPgn("no moves found".to_string()));
    }

    Ok(GameRecord { headers, moves, sans })
}

/// Whether a `{...}` comment is still open at the end of `line`.
fn comment_open_after(line: &str, mut in_comment: bool) -> bool {
    for c in line.chars() {
        match c {
            '}' if in_comment => in_comment = false,
            '{' if !in_comment => in_comment = true,
            ';' if !in_comment => break,
            _ => {}
        }
    }
    in_comment
}

/// A legal chess position.
#[derive(Debug, Clone, Default)]
pub struct Board {
    pos: Chess,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays UCI moves from the starting position.
    pub fn from_uci_moves<S: AsRef<str>>(moves: &[S]) -> Result<Self, RulesError> {
        let mut board = Self::new();
        for uci in moves {
            let mv = board.parse_uci(uci.as_ref())?;
            board.play(&mv);
        }
        Ok(board)
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Color {
        match self.pos.turn() {
            shakmaty::Color::White => Color::White,
            shakmaty::Color::Black => Color::Black,
        }
    }

    pub fn fullmove_number(&self) -> u32 {
        self.pos.fullmoves().get()
    }

    /// Resolves a SAN token (check and annotation suffixes allowed).
    pub fn parse_san(&self, san: &str) -> Result<Move, RulesError> {
        let bare = san.trim().trim_end_matches(['+', '#', '!', '?']);
        // Zero-style castling (`0-0`, `0-0-0`) is common in older records.
        let bare = if bare.starts_with("0-0") {
            bare.replace('0', "O")
        } else {
            bare.to_string()
        };
        let illegal = || RulesError::IllegalMove {
            ply: self.ply() + 1,
            mv: san.to_string(),
        };
        let parsed = San::from_str(&bare).map_err(|_| illegal())?;
        parsed.to_move(&self.pos).map_err(|_| illegal())
    }

    /// Resolves a UCI move such as `e2e4` or `e7e8q`.
    pub fn parse_uci(&self, uci: &str) -> Result<Move, RulesError> {
        let trimmed = uci.trim();
        let parsed =
            UciMove::from_str(trimmed).map_err(|_| RulesError::InvalidUci(trimmed.to_string()))?;
        parsed.to_move(&self.pos).map_err(|_| RulesError::IllegalMove {
            ply: self.ply() + 1,
            mv: trimmed.to_string(),
        })
    }

    /// SAN of a legal move in this position, with `+`/`#` suffix.
    pub fn san(&self, mv: &Move) -> String {
        SanPlus::from_move(self.pos.clone(), mv.clone()).to_string()
    }

    /// SAN of a UCI move, or the UCI text itself if it is not legal here.
    pub fn uci_to_san(&self, uci: &str) -> String {
        match self.parse_uci(uci) {
            Ok(mv) => self.san(&mv),
            Err(_) => uci.to_string(),
        }
    }

    /// Plays a move that must be legal in this position.
    pub fn play(&mut self, mv: &Move) {
        self.pos.play_unchecked(mv.clone());
    }

    pub fn is_game_over(&self) -> bool {
        self.pos.is_game_over()
    }

    /// `1-0`, `0-1`, `1/2-1/2`, or `*` while the game is still running.
    pub fn result(&self) -> String {
        self.pos.outcome().as_str().to_string()
    }

    fn ply(&self) -> usize {
        let full = self.fullmove_number() as usize;
        (full - 1) * 2 + usize::from(self.turn() == Color::Black)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_board() {
        let board = Board::new();
        assert_eq!(board.fen(), STARTING_FEN);
        assert_eq!(board.turn(), Color::White);
        assert_eq!(board.fullmove_number(), 1);
        assert_eq!(board.result(), "*");
        assert!(!board.is_game_over());
    }

    #[test]
    fn test_from_uci_moves() {
        let board = Board::from_uci_moves(&["e2e4", "e7e5", "g1f3"]).unwrap();
        assert_eq!(board.turn(), Color::Black);
        assert_eq!(board.fullmove_number(), 2);
        assert_eq!(
            board.fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn test_uci_errors() {
        assert_eq!(
            Board::new().parse_uci("zz"),
            Err(RulesError::InvalidUci("zz".to_string()))
        );
        assert_eq!(
            Board::new().parse_uci("e2e5"),
            Err(RulesError::IllegalMove {
                ply: 1,
                mv: "e2e5".to_string()
            })
        );
    }

    #[test]
    fn test_uci_to_san() {
        let board = Board::new();
        assert_eq!(board.uci_to_san("g1f3"), "Nf3");
        assert_eq!(board.uci_to_san("a1a8"), "a1a8");
    }

    #[test]
    fn test_checkmate_result() {
        let board = Board::from_uci_moves(&["f2f3", "e7e5", "g2g4", "d8h4"]).unwrap();
        assert!(board.is_game_over());
        assert_eq!(board.result(), "0-1");
    }

    #[test]
    fn test_san_suffix() {
        let board = Board::from_uci_moves(&["f2f3", "e7e5", "g2g4"]).unwrap();
        let mv = board.parse_san("Qh4").unwrap();
        assert_eq!(board.san(&mv), "Qh4#");
    }

    #[test]
    fn test_parse_pgn_headers_and_moves() {
        let pgn = r#"[Event "Casual"]
[White "Alice"]
[Black "Bob"]
[Result "1-0"]

1. e4 {King's pawn} e5 2. Nf3 (2. f4 exf4) Nc6 $1 3. Bb5 ; Spanish
a6 1-0
"#;
        let record = parse_pgn(pgn).unwrap();
        assert_eq!(record.headers.white, "Alice");
        assert_eq!(record.headers.black, "Bob");
        assert_eq!(record.headers.event, "Casual");
        assert_eq!(record.headers.site, "");
        assert_eq!(record.headers.result, "1-0");
        assert_eq!(record.sans, vec!["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]);
        assert_eq!(record.len(), 6);
    }

    #[test]
    fn test_parse_pgn_nested_variations() {
        let record = parse_pgn("1. d4 (1. e4 e5 (1... c5 2. Nf3)) d5 *").unwrap();
        assert_eq!(record.sans, vec!["d4", "d5"]);
        assert_eq!(record.headers, GameHeaders::default());
    }

    #[test]
    fn test_parse_pgn_black_move_numbers() {
        let record = parse_pgn("1. e4 1... c5 2. Nf3").unwrap();
        assert_eq!(record.sans, vec!["e4", "c5", "Nf3"]);
    }

    #[test]
    fn test_parse_pgn_rejects_garbage() {
        assert!(matches!(
            parse_pgn("this is not a game"),
            Err(RulesError::InvalidPgn(_))
        ));
        assert!(matches!(
            parse_pgn("[Event \"Empty\"]\n\n*"),
            Err(RulesError::InvalidPgn(_))
        ));
        assert!(matches!(parse_pgn(""), Err(RulesError::InvalidPgn(_))));
    }

    #[test]
    fn test_parse_pgn_illegal_move() {
        assert_eq!(
            parse_pgn("1. e4 e5 2. Ke3").map(|r| r.len()),
            Err(RulesError::IllegalMove {
                ply: 3,
                mv: "Ke3".to_string()
            })
        );
    }

    #[test]
    fn test_parse_pgn_reads_only_first_game() {
        let pgn = r#"[White "A"]
[Black "B"]

1. e4 e5 1-0

[White "C"]
[Black "D"]

1. d4 d5 0-1
"#;
        let record = parse_pgn(pgn).unwrap();
        assert_eq!(record.headers.white, "A");
        assert_eq!(record.headers.black, "B");
        assert_eq!(record.sans, vec!["e4", "e5"]);
    }

    #[test]
    fn test_parse_pgn_zero_castling() {
        let record = parse_pgn("1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. 0-0 Nf6 *").unwrap();
        assert_eq!(record.sans[6], "O-O");
        assert_eq!(record.len(), 8);

        let board = Board::from_uci_moves(&["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5"]).unwrap();
        assert_eq!(board.parse_san("0-0+").ok(), board.parse_san("O-O").ok());
    }

    #[test]
    fn test_parse_pgn_bracket_inside_wrapped_comment() {
        let record = parse_pgn("1. e4 { a long comment\n[%clk 0:03:00] } e5 *").unwrap();
        assert_eq!(record.sans, vec!["e4", "e5"]);
    }

    #[test]
    fn test_comment_state_across_lines() {
        assert!(comment_open_after("1. e4 { opens", false));
        assert!(!comment_open_after("closes } e5", true));
        assert!(!comment_open_after("e5 ; rest { ignored", false));
        assert!(comment_open_after("still [%clk 0:01:00] inside", true));
    }
}
