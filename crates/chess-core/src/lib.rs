//! Core types for chess.
//!
//! This crate provides the fundamental types shared by the replay board,
//! the opening book and the analysis pipeline:
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates

mod color;
mod piece;
mod square;

pub use color::{Color, ParseColorError};
pub use piece::Piece;
pub use square::{File, ParseSquareError, Rank, Square};
