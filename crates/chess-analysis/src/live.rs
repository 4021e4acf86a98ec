//! Live games against the engine, with every player move graded.
//!
//! The service keeps no state between calls: a [`LiveGame`] is the whole
//! game and the caller stores it between requests.

use chess_core::{Color, Square};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::analyzer::{grade_ply, mover_eval, AnalysisConfig};
use crate::engine::{AnalysisEngine, EngineError, EngineFactory, PositionAnalysis};
use crate::quality::MoveQuality;
use crate::rules::{Board, RulesError};

/// Errors from live play requests.
#[derive(Error, Debug)]
pub enum LiveError {
    #[error("it is not the player's turn")]
    NotPlayersTurn,

    #[error("the game is over")]
    GameOver,

    #[error("there is no move to undo")]
    NothingToUndo,

    #[error("engine returned no move")]
    NoEngineMove,

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A game in progress, as UCI moves from the starting position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveGame {
    pub moves_uci: Vec<String>,
    pub player_color: Color,
}

impl LiveGame {
    pub fn new(player_color: Color) -> Self {
        Self {
            moves_uci: Vec::new(),
            player_color,
        }
    }

    pub fn board(&self) -> Result<Board, RulesError> {
        Board::from_uci_moves(&self.moves_uci)
    }

    /// FEN of the current position.
    pub fn fen(&self) -> Result<String, RulesError> {
        Ok(self.board()?.fen())
    }
}

/// Where the game stands after a start or an undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub fen: String,
    /// SAN of the move the engine played, if it had to move.
    pub engine_move: Option<String>,
}

/// Outcome of a player's move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveFeedback {
    pub fen: String,
    pub player_move: String,
    pub engine_move: Option<String>,
    pub classification: Option<MoveQuality>,
    pub cp_loss: Option<i32>,
    /// What the engine would have played instead, in SAN.
    pub best_move: Option<String>,
    pub game_over: bool,
    pub result: String,
}

/// Suggested move for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub best_move_uci: String,
    pub best_move_san: String,
    pub from_square: Square,
    pub to_square: Square,
    /// Player's evaluation of the current position.
    pub eval_cp: Option<i32>,
}

/// Runs live games, acquiring one engine per request.
#[derive(Debug, Clone)]
pub struct LiveCoach<F> {
    factory: F,
    config: AnalysisConfig,
}

impl<F: EngineFactory> LiveCoach<F> {
    pub fn new(factory: F, config: AnalysisConfig) -> Self {
        Self { factory, config }
    }

    /// Starts a game. The engine opens when the player takes Black.
    pub fn start(&self, player_color: Color) -> Result<(LiveGame, PositionUpdate), LiveError> {
        let mut game = LiveGame::new(player_color);
        let mut board = Board::new();
        let engine_move = if player_color == Color::Black {
            let mut engine = self.factory.acquire()?;
            Some(self.engine_reply(&mut engine, &mut board, &mut game.moves_uci)?)
        } else {
            None
        };
        info!(player = %player_color, "live game started");
        Ok((
            game,
            PositionUpdate {
                fen: board.fen(),
                engine_move,
            },
        ))
    }

    /// Plays the player's `uci` move, grades it and lets the engine answer.
    ///
    /// `game` is only updated when the whole request succeeds.
    pub fn play_move(&self, game: &mut LiveGame, uci: &str) -> Result<MoveFeedback, LiveError> {
        let mut board = game.board()?;
        if board.is_game_over() {
            return Err(LiveError::GameOver);
        }
        if board.turn() != game.player_color {
            return Err(LiveError::NotPlayersTurn);
        }
        let mv = board.parse_uci(uci)?;
        let player_move = board.san(&mv);

        let mut engine = self.factory.acquire()?;
        let mut moves = game.moves_uci.clone();
        let limit = self.config.live_limit;

        let before = engine.analyse(&board.fen(), limit)?;
        let best_move = before.best_line_move().map(|best| board.uci_to_san(best));

        board.play(&mv);
        moves.push(uci.trim().to_string());
        let after = engine.analyse(&board.fen(), limit)?;
        let grade = grade_ply(&before, &after, game.player_color);
        debug!(player_move = %player_move, cp_loss = ?grade.cp_loss, "graded player move");

        let engine_move = if board.is_game_over() {
            None
        } else {
            // The after-search is the engine's own search of this position.
            Some(play_engine_move(&after, &mut board, &mut moves)?)
        };

        game.moves_uci = moves;
        Ok(MoveFeedback {
            fen: board.fen(),
            player_move,
            engine_move,
            classification: grade.classification,
            cp_loss: grade.cp_loss,
            best_move,
            game_over: board.is_game_over(),
            result: board.result(),
        })
    }

    /// Takes back the last full turn, replaying the engine if it is then to move.
    pub fn undo(&self, game: &mut LiveGame) -> Result<PositionUpdate, LiveError> {
        if game.moves_uci.is_empty() {
            return Err(LiveError::NothingToUndo);
        }
        let mut moves = game.moves_uci.clone();
        let keep = moves.len().saturating_sub(2);
        moves.truncate(keep);

        let mut board = Board::from_uci_moves(&moves)?;
        let engine_move = if board.turn() != game.player_color && !board.is_game_over() {
            let mut engine = self.factory.acquire()?;
            Some(self.engine_reply(&mut engine, &mut board, &mut moves)?)
        } else {
            None
        };

        game.moves_uci = moves;
        Ok(PositionUpdate {
            fen: board.fen(),
            engine_move,
        })
    }

    /// The engine's preferred move for the player, at the review budget.
    pub fn hint(&self, game: &LiveGame) -> Result<Hint, LiveError> {
        let board = game.board()?;
        if board.is_game_over() {
            return Err(LiveError::GameOver);
        }
        let turn = board.turn();
        if turn != game.player_color {
            return Err(LiveError::NotPlayersTurn);
        }

        let mut engine = self.factory.acquire()?;
        let analysis = engine.analyse(&board.fen(), self.config.analysis_limit)?;
        let best = analysis.best_line_move().ok_or(LiveError::NoEngineMove)?;
        let (from_square, to_square) = uci_squares(best)?;

        Ok(Hint {
            best_move_uci: best.to_string(),
            best_move_san: board.uci_to_san(best),
            from_square,
            to_square,
            eval_cp: mover_eval(&analysis, turn, turn).map(|e| e.to_centipawns()),
        })
    }

    fn engine_reply<E: AnalysisEngine>(
        &self,
        engine: &mut E,
        board: &mut Board,
        moves: &mut Vec<String>,
    ) -> Result<String, LiveError> {
        let analysis = engine.analyse(&board.fen(), self.config.live_limit)?;
        play_engine_move(&analysis, board, moves)
    }
}

/// Plays the engine's chosen move from `analysis`, returning its SAN.
fn play_engine_move(
    analysis: &PositionAnalysis,
    board: &mut Board,
    moves: &mut Vec<String>,
) -> Result<String, LiveError> {
    let uci = analysis.best_line_move().ok_or(LiveError::NoEngineMove)?;
    let mv = board
        .parse_uci(uci)
        .map_err(|_| EngineError::InvalidResponse(format!("illegal engine move '{uci}'")))?;
    let san = board.san(&mv);
    board.play(&mv);
    moves.push(uci.to_string());
    debug!(engine_move = %san, "engine replied");
    Ok(san)
}

fn uci_squares(uci: &str) -> Result<(Square, Square), EngineError> {
    let square = |range: std::ops::Range<usize>| uci.get(range).and_then(Square::from_algebraic);
    match (square(0..2), square(2..4)) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(EngineError::InvalidResponse(format!("malformed move '{uci}'"))),
    }
}
