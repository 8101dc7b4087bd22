//! Game flow pieces that an unattended player needs.
//!
//! - [`PieceGenerator`] - seedable uniform piece source with a one-piece preview
//! - [`PieceSeed`] - seed for deterministic piece generation
//! - [`LevelProgress`] - level, gravity and score bookkeeping for a session
//!
//! # Example
//!
//! ```
//! use tetrace_engine::{LevelProgress, PieceGenerator};
//!
//! let mut pieces = PieceGenerator::new();
//! let current = pieces.pop_next();
//! let preview = pieces.peek_next();
//!
//! let mut progress = LevelProgress::new(18);
//! assert_eq!(progress.gravity(), 2);
//! progress.record_clear(4);
//! assert_eq!(progress.score(), 1200 * 19);
//! # let _ = (current, preview);
//! ```

pub use self::{piece_generator::*, speed::*};

mod piece_generator;
mod speed;
