//! Interactive live game on a line-oriented terminal.

use std::io::{self, BufRead, Write};

use chess_analysis::{EngineFactory, LiveCoach, LiveGame, MoveFeedback};
use chess_core::Color;
use tracing::warn;

const HELP: &str = "Enter moves in UCI notation (e2e4, e7e8q). Commands: undo, hint, fen, help, quit";

/// Plays one game against the engine, reading commands from `input`.
///
/// Request failures are reported to `out` and the game continues; only I/O
/// errors end the session early.
pub fn run<F, R, W>(coach: &LiveCoach<F>, color: Color, input: R, out: &mut W) -> io::Result<()>
where
    F: EngineFactory,
    R: BufRead,
    W: Write,
{
    writeln!(out, "You play {color}. {HELP}")?;
    let mut game = match coach.start(color) {
        Ok((game, update)) => {
            if let Some(engine_move) = update.engine_move {
                writeln!(out, "Engine plays {engine_move}")?;
            }
            game
        }
        Err(e) => {
            warn!(error = %e, "could not start live game");
            writeln!(out, "error: {e}")?;
            return Ok(());
        }
    };

    for line in input.lines() {
        let line = line?;
        let command = line.trim();
        match command {
            "" => continue,
            "quit" | "exit" => break,
            "help" => writeln!(out, "{HELP}")?,
            "fen" => match game.fen() {
                Ok(fen) => writeln!(out, "{fen}")?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            "undo" => match coach.undo(&mut game) {
                Ok(update) => {
                    writeln!(out, "Position: {}", update.fen)?;
                    if let Some(engine_move) = update.engine_move {
                        writeln!(out, "Engine plays {engine_move}")?;
                    }
                }
                Err(e) => writeln!(out, "error: {e}")?,
            },
            "hint" => match coach.hint(&game) {
                Ok(hint) => writeln!(
                    out,
                    "Try {} ({} -> {}), eval {}",
                    hint.best_move_san,
                    hint.from_square,
                    hint.to_square,
                    hint.eval_cp.map_or_else(|| "n/a".to_string(), |cp| cp.to_string())
                )?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            uci => match coach.play_move(&mut game, uci) {
                Ok(feedback) => {
                    report(out, &feedback)?;
                    if feedback.game_over {
                        return finish(out, &game, &feedback.result);
                    }
                }
                Err(e) => writeln!(out, "error: {e}")?,
            },
        }
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, feedback: &MoveFeedback) -> io::Result<()> {
    let grade = feedback
        .classification
        .map_or_else(|| "ungraded".to_string(), |q| q.to_string());
    match (&feedback.cp_loss, &feedback.best_move) {
        (Some(loss), Some(best)) if *best != feedback.player_move => {
            writeln!(out, "{}: {grade} (loss {loss} cp, best was {best})", feedback.player_move)?
        }
        _ => writeln!(out, "{}: {grade}", feedback.player_move)?,
    }
    if let Some(engine_move) = &feedback.engine_move {
        writeln!(out, "Engine plays {engine_move}")?;
    }
    Ok(())
}

fn finish<W: Write>(out: &mut W, game: &LiveGame, result: &str) -> io::Result<()> {
    writeln!(out, "Game over: {result} after {} plies", game.moves_uci.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_analysis::{AnalysisConfig, EngineSettings, UciEngineFactory};

    fn offline_coach() -> LiveCoach<UciEngineFactory> {
        let factory = UciEngineFactory::new("/nonexistent/engine", EngineSettings::default());
        LiveCoach::new(factory, AnalysisConfig::default())
    }

    fn run_script(color: Color, script: &str) -> String {
        let mut out = Vec::new();
        run(&offline_coach(), color, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_quit_and_help() {
        let out = run_script(Color::White, "help\nfen\nquit\ne2e4\n");
        assert!(out.starts_with("You play White."));
        assert!(out.contains("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"));
        assert!(!out.contains("Engine not found"));
    }

    #[test]
    fn test_errors_are_reported_and_session_continues() {
        let out = run_script(Color::White, "undo\ne2e5\ne2e4\nquit\n");
        assert!(out.contains("error: there is no move to undo"));
        assert!(out.contains("error: illegal move 'e2e5'"));
        assert!(out.contains("Engine not found at path: /nonexistent/engine"));
    }

    #[test]
    fn test_black_without_engine_cannot_start() {
        let out = run_script(Color::Black, "e7e5\n");
        assert!(out.contains("error: Engine not found"));
        assert!(!out.contains("e7e5"));
    }

    #[test]
    fn test_report_mentions_better_move() {
        let feedback = MoveFeedback {
            fen: String::new(),
            player_move: "h4".to_string(),
            engine_move: Some("e5".to_string()),
            classification: Some(chess_analysis::MoveQuality::Inaccuracy),
            cp_loss: Some(120),
            best_move: Some("e4".to_string()),
            game_over: false,
            result: "*".to_string(),
        };
        let mut out = Vec::new();
        report(&mut out, &feedback).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "h4: Inaccuracy (loss 120 cp, best was e4)\nEngine plays e5\n");
    }
}
