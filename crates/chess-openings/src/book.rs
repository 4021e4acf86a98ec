//! The annotated opening book, built once at startup.

use std::collections::HashMap;

use chess_core::Color;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::annotate::{annotate_line, AnnotateError, AnnotatedLine};
use crate::database::OpeningDatabase;

/// An opening with all of its lines annotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedOpening {
    pub id: String,
    pub name: String,
    pub side: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eco: Option<String>,
    pub description: String,
    pub lines: Vec<AnnotatedLine>,
}

/// Immutable annotated view of an [`OpeningDatabase`].
///
/// Building the book replays every line exactly once. Share it by
/// reference or behind an `Arc`; nothing mutates it afterwards.
#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    openings: Vec<AnnotatedOpening>,
    index: HashMap<String, usize>,
}

impl OpeningBook {
    /// Annotates every line of every opening in `db`.
    ///
    /// Fails on the first line that does not replay.
    pub fn build(db: &OpeningDatabase) -> Result<Self, AnnotateError> {
        let mut openings = Vec::with_capacity(db.len());
        let mut index = HashMap::with_capacity(db.len());
        let mut line_count = 0;

        for opening in db.all() {
            let lines = opening
                .lines
                .iter()
                .enumerate()
                .map(|(i, line)| annotate_line(&opening.id, i, line))
                .collect::<Result<Vec<_>, _>>()?;
            line_count += lines.len();

            index.insert(opening.id.clone(), openings.len());
            openings.push(AnnotatedOpening {
                id: opening.id.clone(),
                name: opening.name.clone(),
                side: opening.side,
                eco: opening.eco.clone(),
                description: opening.description.clone(),
                lines,
            });
        }

        info!(openings = openings.len(), lines = line_count, "built opening book");
        Ok(Self { openings, index })
    }

    #[must_use]
    pub fn opening(&self, id: &str) -> Option<&AnnotatedOpening> {
        self.index.get(id).map(|&i| &self.openings[i])
    }

    /// Line `index` of opening `id`.
    #[must_use]
    pub fn line(&self, id: &str, index: usize) -> Option<&AnnotatedLine> {
        self.opening(id)?.lines.get(index)
    }

    /// All openings in database order.
    #[must_use]
    pub fn openings(&self) -> &[AnnotatedOpening] {
        &self.openings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.openings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }
}
