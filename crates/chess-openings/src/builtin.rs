//! Built-in opening data.
//!
//! The curated lines are compiled into the library from
//! `data/openings.json`.

use crate::database::{DatabaseError, OpeningDatabase};

const OPENINGS_JSON: &str = include_str!("../data/openings.json");

/// Loads the built-in opening database.
///
/// Covers forty popular openings for both sides, each with a commented
/// main line.
pub fn builtin() -> Result<OpeningDatabase, DatabaseError> {
    OpeningDatabase::from_json(OPENINGS_JSON)
}
