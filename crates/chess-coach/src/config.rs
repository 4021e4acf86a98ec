//! Configuration file loading for the coach.
//!
//! Settings come from `coach.toml` in the current directory unless another
//! path is given. Every key is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_analysis::{AnalysisConfig, EngineSettings, SearchLimit, UciEngineFactory};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Settings for the analysis engine.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the UCI engine executable.
    /// Defaults to "stockfish" (assumes it's in PATH).
    pub path: String,
    /// Search time per position for game review and hints.
    pub analysis_movetime_ms: u64,
    /// Search time per position during live play.
    pub live_movetime_ms: u64,
    /// Grace period on top of the search time before the engine counts as unresponsive.
    pub response_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: "stockfish".to_string(),
            analysis_movetime_ms: 500,
            live_movetime_ms: 100,
            response_timeout_ms: 10_000,
        }
    }
}

/// Main coach configuration structure.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CoachConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,
    pub engine: EngineConfig,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl CoachConfig {
    /// Loads the configuration from `path`, or the defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default path to the configuration file.
    pub fn default_path() -> PathBuf {
        PathBuf::from("coach.toml")
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            analysis_limit: SearchLimit::MoveTime(Duration::from_millis(
                self.engine.analysis_movetime_ms,
            )),
            live_limit: SearchLimit::MoveTime(Duration::from_millis(self.engine.live_movetime_ms)),
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            response_timeout: Duration::from_millis(self.engine.response_timeout_ms),
        }
    }

    pub fn engine_factory(&self) -> UciEngineFactory {
        UciEngineFactory::new(self.engine.path.clone(), self.engine_settings())
    }
}
