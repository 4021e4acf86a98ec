//! Simplified position replay for curated move lists.
//!
//! This crate turns known-valid SAN move lists (opening lines, study
//! material) into fully resolved `(piece, from, to)` moves without a full
//! rules engine:
//! - [`Board`] - sparse square to piece mapping with the standard start position
//! - [`SanToken`] - parsed form of a SAN move token
//! - [`MoveResolver`] - finds the origin square of each token and applies it
//!
//! The replay is an annotation aid, not a legality checker: check, pins,
//! en passant and promotion are not modelled.
//!
//! # Example
//!
//! ```
//! use chess_replay::MoveResolver;
//!
//! let mut resolver = MoveResolver::new();
//! let mv = resolver.resolve("Nf3", "Develop the knight").unwrap();
//! assert_eq!(mv.description(), "Knight g1 -> f3");
//! ```

mod board;
mod geometry;
mod resolver;
pub mod san;

pub use board::{Board, Occupant};
pub use resolver::{castling_squares, CastleSquares, MoveResolver, ResolveError, ResolvedMove};
pub use san::{CastleSide, SanToken};
