//! Curated chess opening lines and practice.
//!
//! This crate stores named openings with commented SAN lines, annotates
//! each line with the squares every move travels between, and checks a
//! student's moves against a chosen line.

pub mod annotate;
pub mod book;
pub mod builtin;
pub mod database;
pub mod opening;
pub mod trainer;

pub use annotate::{annotate_line, AnnotateError, AnnotatedLine, AnnotatedMove};
pub use book::{AnnotatedOpening, OpeningBook};
pub use builtin::builtin;
pub use database::{DatabaseError, OpeningDatabase};
pub use opening::{Line, MoveToken, Opening};
pub use trainer::{MoveCheck, NextMove, OpeningTrainer, TrainerError};
