//! Grid Tactics - rules engine for a grid-based tactical card game
//!
//! Cards are played onto a square grid, gain and lose statuses from their
//! neighbours, and score points along rows, columns and diagonals. The
//! engine owns the authoritative state; drivers feed it player actions.

pub mod config;
pub mod core;
pub mod error;
#[macro_use]
pub mod game;
pub mod loader;
pub mod zones;

pub use error::{EngineError, Result};
