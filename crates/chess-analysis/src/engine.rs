//! UCI engine wrapper for position analysis.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::evaluation::Score;

/// How long `Drop` waits for the engine to exit after `quit` before killing it.
const QUIT_GRACE: Duration = Duration::from_millis(500);

/// Errors that can occur when working with chess engines.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process.
    #[error("Failed to spawn engine: {0}")]
    SpawnError(#[from] std::io::Error),
    /// Engine executable was not found at the specified path.
    #[error("Engine not found at path: {0}")]
    NotFound(String),
    /// Engine failed to initialize properly (UCI handshake failed).
    #[error("Engine initialization failed")]
    InitFailed,
    /// Engine did not answer within the allotted time.
    #[error("Engine did not respond within {0:?}")]
    Timeout(Duration),
    /// Engine returned an invalid or unexpected response.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
}

/// Budget for a single search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    MoveTime(Duration),
    Depth(u32),
}

impl SearchLimit {
    fn go_command(self) -> String {
        match self {
            SearchLimit::MoveTime(t) => format!("go movetime {}", t.as_millis()),
            SearchLimit::Depth(d) => format!("go depth {d}"),
        }
    }

    /// Wall-clock time the search itself is expected to take.
    fn expected_duration(self) -> Duration {
        match self {
            SearchLimit::MoveTime(t) => t,
            SearchLimit::Depth(_) => Duration::ZERO,
        }
    }
}

/// Result of analyzing a chess position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionAnalysis {
    /// The best move found, in UCI notation, if the position has one.
    pub best_move: Option<String>,
    /// Score from the side to move's point of view, if the engine gave one.
    pub score: Option<Score>,
    /// The search depth reached.
    pub depth: u32,
    /// The number of nodes searched.
    pub nodes: u64,
    /// The principal variation (sequence of best moves).
    pub pv: Vec<String>,
}

impl PositionAnalysis {
    /// First move of the principal variation, else the reported best move.
    pub fn best_line_move(&self) -> Option<&str> {
        self.pv.first().map(String::as_str).or(self.best_move.as_deref())
    }
}

/// Something that evaluates positions.
pub trait AnalysisEngine {
    /// Resets engine state before an unrelated sequence of positions.
    fn new_game(&mut self) -> Result<(), EngineError>;

    /// Searches `fen` within `limit`.
    fn analyse(&mut self, fen: &str, limit: SearchLimit) -> Result<PositionAnalysis, EngineError>;
}

/// Hands out exclusively owned engine handles.
///
/// Each request acquires its own handle. Dropping the handle releases the
/// underlying resource, so every exit path of the request cleans up.
pub trait EngineFactory {
    type Engine: AnalysisEngine;

    fn acquire(&self) -> Result<Self::Engine, EngineError>;
}

/// Timing settings for engine processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Allowance on top of the search budget before a response counts as late.
    pub response_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(10),
        }
    }
}

/// Wrapper for UCI-compatible analysis engines like Stockfish.
///
/// Output is read on a background thread so every wait on the engine is
/// bounded by a deadline.
pub struct UciEngine {
    process: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    name: String,
    settings: EngineSettings,
}

impl UciEngine {
    /// Spawns the engine at `engine_path` and performs the UCI handshake.
    ///
    /// # Errors
    ///
    /// - `EngineError::NotFound` if there is no executable at that path
    /// - `EngineError::SpawnError` if the engine process fails to start
    /// - `EngineError::InitFailed` or `EngineError::Timeout` if the handshake fails
    pub fn spawn(engine_path: &str, settings: EngineSettings) -> Result<Self, EngineError> {
        let mut process = Command::new(engine_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => EngineError::NotFound(engine_path.to_string()),
                _ => EngineError::SpawnError(e),
            })?;

        let (stdin, stdout) = match (process.stdin.take(), process.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = process.kill();
                let _ = process.wait();
                return Err(EngineError::InitFailed);
            }
        };

        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line.trim().to_string()).is_err() {
                    break;
                }
            }
        });

        let mut engine = Self {
            process,
            stdin,
            lines,
            name: String::new(),
            settings,
        };
        engine.init_uci()?;
        debug!(engine = %engine.name, "engine ready");
        Ok(engine)
    }

    fn init_uci(&mut self) -> Result<(), EngineError> {
        self.send_command("uci")?;
        let budget = self.settings.response_timeout;
        let deadline = Instant::now() + budget;

        let mut name = String::new();
        loop {
            let line = self.read_line(deadline, budget).map_err(|e| match e {
                EngineError::InvalidResponse(_) => EngineError::InitFailed,
                other => other,
            })?;
            if let Some(id) = line.strip_prefix("id name ") {
                name = id.to_string();
            } else if line == "uciok" {
                break;
            }
        }

        self.name = if name.is_empty() {
            "Unknown Engine".to_string()
        } else {
            name
        };

        self.wait_ready()
    }

    fn wait_ready(&mut self) -> Result<(), EngineError> {
        self.send_command("isready")?;
        let budget = self.settings.response_timeout;
        let deadline = Instant::now() + budget;
        while self.read_line(deadline, budget)? != "readyok" {}
        Ok(())
    }

    /// Returns the engine's name as reported via UCI protocol.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn run_search(&mut self, limit: SearchLimit) -> Result<PositionAnalysis, EngineError> {
        self.send_command(&limit.go_command())?;
        let budget = limit.expected_duration() + self.settings.response_timeout;
        let deadline = Instant::now() + budget;

        let mut analysis = PositionAnalysis::default();
        loop {
            let line = self.read_line(deadline, budget)?;

            if line.starts_with("info ") {
                if let Some(info) = parse_info_line(&line) {
                    analysis.depth = info.depth;
                    analysis.score = Some(info.score);
                    analysis.nodes = info.nodes;
                    if !info.pv.is_empty() {
                        analysis.pv = info.pv;
                    }
                }
            } else if let Some(rest) = line.strip_prefix("bestmove") {
                analysis.best_move = match rest.split_whitespace().next() {
                    Some("(none)") | Some("0000") => None,
                    Some(mv) => Some(mv.to_string()),
                    None => {
                        return Err(EngineError::InvalidResponse(
                            "bestmove without a move".to_string(),
                        ))
                    }
                };
                break;
            }
        }

        Ok(analysis)
    }

    fn send_command(&mut self, command: &str) -> Result<(), EngineError> {
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&self, deadline: Instant, budget: Duration) -> Result<String, EngineError> {
        recv_line(&self.lines, deadline, budget)
    }
}

/// Waits for the next engine line until `deadline`; `budget` is the total
/// wait the deadline was derived from and is what a timeout reports.
fn recv_line(
    lines: &Receiver<String>,
    deadline: Instant,
    budget: Duration,
) -> Result<String, EngineError> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    match lines.recv_timeout(remaining) {
        Ok(line) => Ok(line),
        Err(RecvTimeoutError::Timeout) => Err(EngineError::Timeout(budget)),
        Err(RecvTimeoutError::Disconnected) => Err(EngineError::InvalidResponse(
            "Engine closed unexpectedly".to_string(),
        )),
    }
}

impl AnalysisEngine for UciEngine {
    fn new_game(&mut self) -> Result<(), EngineError> {
        self.send_command("ucinewgame")?;
        self.wait_ready()
    }

    fn analyse(&mut self, fen: &str, limit: SearchLimit) -> Result<PositionAnalysis, EngineError> {
        self.send_command(&format!("position fen {}", fen))?;
        let started = Instant::now();
        let analysis = self.run_search(limit)?;
        debug!(
            fen,
            best_move = ?analysis.best_move,
            score = ?analysis.score,
            depth = analysis.depth,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "engine search finished"
        );
        Ok(analysis)
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.send_command("quit");

        let deadline = Instant::now() + QUIT_GRACE;
        while Instant::now() < deadline {
            match self.process.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => thread::sleep(Duration::from_millis(10)),
                Err(_) => break,
            }
        }

        if let Err(e) = self.process.kill() {
            warn!(engine = %self.name, error = %e, "failed to kill engine process");
        }
        let _ = self.process.wait();
    }
}

/// Spawns a fresh [`UciEngine`] for every acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UciEngineFactory {
    pub path: String,
    pub settings: EngineSettings,
}

impl UciEngineFactory {
    pub fn new(path: impl Into<String>, settings: EngineSettings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }
}

impl EngineFactory for UciEngineFactory {
    type Engine = UciEngine;

    fn acquire(&self) -> Result<UciEngine, EngineError> {
        UciEngine::spawn(&self.path, self.settings)
    }
}

/// Fields of a UCI `info` line that carries a score.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InfoLine {
    depth: u32,
    score: Score,
    nodes: u64,
    pv: Vec<String>,
}

/// Parses "info depth X ... score cp|mate Y ... nodes Z ... pv m1 m2 ...".
///
/// Returns `None` for info lines without depth or score.
fn parse_info_line(line: &str) -> Option<InfoLine> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let mut depth: Option<u32> = None;
    let mut cp: Option<i32> = None;
    let mut mate: Option<i32> = None;
    let mut nodes: u64 = 0;
    let mut pv: Vec<String> = Vec::new();

    let mut i = 0;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                depth = parts.get(i + 1).and_then(|d| d.parse().ok());
                i += 1;
            }
            "score" => match parts.get(i + 1) {
                Some(&"cp") => {
                    cp = parts.get(i + 2).and_then(|v| v.parse().ok());
                    i += 2;
                }
                Some(&"mate") => {
                    mate = parts.get(i + 2).and_then(|v| v.parse().ok());
                    i += 2;
                }
                _ => {}
            },
            "nodes" => {
                nodes = parts.get(i + 1).and_then(|n| n.parse().ok()).unwrap_or(0);
                i += 1;
            }
            "pv" => {
                pv = parts[i + 1..].iter().map(|m| m.to_string()).collect();
                break;
            }
            _ => {}
        }
        i += 1;
    }

    Some(InfoLine {
        depth: depth?,
        score: Score::from_uci(cp, mate)?,
        nodes,
        pv,
    })
}
