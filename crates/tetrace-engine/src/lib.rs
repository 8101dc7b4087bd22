//! Board model for a falling-block puzzle game with NES-style movement timing.
//!
//! - [`Grid`] - fixed-size cell matrix (row 0 is the floor)
//! - [`PieceKind`] / [`PieceData`] - static rotation-offset tables
//! - [`Piece`] - a placed piece instance with derived absolute cells
//! - [`Board`] - a grid plus line-clear counters
//!
//! The [`engine`] module holds the pieces of game flow the search needs to run
//! unattended: a seedable piece generator and the level to gravity table.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("grid dimensions must be non-zero, got {height}x{width}")]
pub struct GridSizeError {
    pub height: usize,
    pub width: usize,
}
