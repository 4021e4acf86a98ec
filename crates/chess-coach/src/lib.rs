//! Chess Coach - opening practice, game review and live play from the terminal.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration loading
//! - [`render`] - Plain-text rendering of openings and analyses
//! - [`session`] - Interactive live game loop

pub mod config;
pub mod render;
pub mod session;
