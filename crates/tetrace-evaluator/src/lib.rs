//! Placement search for a falling-block puzzle.
//!
//! Given a board and the piece about to enter, this crate finds every final
//! position the piece can reach under NES-style movement timing, builds the
//! resulting boards and ranks them with a two-mode heuristic.
//!
//! # Pipeline
//!
//! ```text
//! MoveEvaluator (facade: rank candidates, keep the list)
//!     ↓ uses
//! MoveGenerator (copy board, lock piece, clear rows)
//!     ↓ uses
//! ReachabilityAnalyzer (collision maps, accessible columns, resting cells)
//! ```
//!
//! Each candidate board is wrapped in a [`placement_analysis::PlacementAnalysis`]
//! and scored by a [`heuristic::PlacementEvaluator`]. The default
//! [`heuristic::HeuristicEvaluator`] scores hole-free boards in *position* mode
//! and boards with holes in *burn* mode; any hole-free board outranks any board
//! with a hole.
//!
//! # Supporting Modules
//!
//! - [`config`] - grid size, timing, well selection, heuristic weights
//! - [`board_analysis`] - lazily computed heights, holes and valleys
//! - [`session`] - unattended play that always takes the best candidate

pub mod board_analysis;
pub mod config;
pub mod evaluator;
pub mod heuristic;
pub mod move_generator;
pub mod placement_analysis;
pub mod reachability;
pub mod session;
