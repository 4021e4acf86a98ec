//! Opening database storage and lookup.

use std::collections::HashSet;
use std::path::Path;

use chess_core::Color;
use thiserror::Error;

use crate::opening::Opening;

/// Errors that can occur when working with opening databases.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to read the opening database file.
    #[error("failed to read opening database: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A line has no moves.
    #[error("opening '{opening}' line {line} has no moves")]
    EmptyLine { opening: String, line: usize },

    /// An opening has no lines.
    #[error("opening '{0}' has no lines")]
    NoLines(String),

    /// Two openings share an id.
    #[error("duplicate opening id '{0}'")]
    DuplicateId(String),
}

/// A database for storing and searching named chess openings.
#[derive(Debug, Clone, Default)]
pub struct OpeningDatabase {
    /// All openings stored in the database.
    openings: Vec<Opening>,
}

impl OpeningDatabase {
    /// Creates a new empty opening database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validated database from the given openings.
    pub fn with_openings(openings: Vec<Opening>) -> Result<Self, DatabaseError> {
        let db = Self { openings };
        db.validate()?;
        Ok(db)
    }

    /// Parses a JSON array of openings.
    pub fn from_json(json: &str) -> Result<Self, DatabaseError> {
        let openings: Vec<Opening> = serde_json::from_str(json)?;
        Self::with_openings(openings)
    }

    /// Loads a JSON opening file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks that ids are unique and every line has at least one move.
    pub fn validate(&self) -> Result<(), DatabaseError> {
        let mut seen = HashSet::new();
        for opening in &self.openings {
            if !seen.insert(opening.id.as_str()) {
                return Err(DatabaseError::DuplicateId(opening.id.clone()));
            }
            if opening.lines.is_empty() {
                return Err(DatabaseError::NoLines(opening.id.clone()));
            }
            if let Some(line) = opening.lines.iter().position(|l| l.is_empty()) {
                return Err(DatabaseError::EmptyLine {
                    opening: opening.id.clone(),
                    line,
                });
            }
        }
        Ok(())
    }

    /// Returns the number of openings in the database.
    #[must_use]
    pub fn len(&self) -> usize {
        self.openings.len()
    }

    /// Returns true if the database contains no openings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }

    /// Adds an opening to the database after validating it.
    pub fn add(&mut self, opening: Opening) -> Result<(), DatabaseError> {
        self.openings.push(opening);
        if let Err(err) = self.validate() {
            self.openings.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Returns all openings in the database.
    #[must_use]
    pub fn all(&self) -> &[Opening] {
        &self.openings
    }

    /// Finds an opening by its unique ID.
    ///
    /// Returns `None` if no opening with the given ID exists.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Opening> {
        self.openings.iter().find(|o| o.id == id)
    }

    /// Finds all openings matching an ECO code prefix.
    ///
    /// For example, `by_eco("C5")` would match "C50", "C51", etc.
    #[must_use]
    pub fn by_eco(&self, eco_prefix: &str) -> Vec<&Opening> {
        self.filter(|o| {
            o.eco
                .as_ref()
                .is_some_and(|eco| eco.starts_with(eco_prefix))
        })
    }

    /// Finds all openings practised from the given side.
    #[must_use]
    pub fn by_side(&self, side: Color) -> Vec<&Opening> {
        self.filter(|o| o.side == side)
    }

    /// Searches for openings by name (case-insensitive substring match).
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Opening> {
        let query_lower = query.to_lowercase();
        self.filter(|o| o.name.to_lowercase().contains(&query_lower))
    }

    /// Filters openings using a custom predicate.
    #[must_use]
    pub fn filter<F>(&self, predicate: F) -> Vec<&Opening>
    where
        F: Fn(&Opening) -> bool,
    {
        self.openings.iter().filter(|o| predicate(o)).collect()
    }
}
