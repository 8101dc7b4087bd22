//! Placement scoring.
//!
//! Every candidate board is scored in exactly one of two modes:
//!
//! - **Position mode** for boards without holes: keep the surface flat and
//!   low, keep the well open, and reward four-row clears.
//! - **Burn mode** for boards with at least one hole: dig towards the
//!   topmost hole by filling its row and keeping the stack short.
//!
//! Burn totals are shifted down by an offset large enough that every
//! position-mode total is strictly greater than every burn-mode total for the
//! same grid size, whatever the weights are.
//!
//! # Example
//!
//! ```
//! use tetrace_engine::{Board, Grid, Piece, PieceKind};
//! use tetrace_evaluator::{
//!     config::HeuristicParams,
//!     heuristic::{HeuristicEvaluator, PlacementEvaluator},
//!     move_generator::GeneratedMove,
//!     placement_analysis::PlacementAnalysis,
//!     reachability::Placement,
//! };
//!
//! let grid = Grid::from_ascii("....\n....\n##..\n###.").unwrap();
//! let generated = GeneratedMove {
//!     placement: Placement { row: 0, col: 1, orientation: 0 },
//!     piece: Piece::new(PieceKind::L),
//!     board: Board::from_grid(grid),
//!     cleared_rows: 0,
//! };
//! let evaluator = HeuristicEvaluator::new(HeuristicParams::default());
//! let score = evaluator.evaluate_placement(&PlacementAnalysis::new(&generated, 3));
//! assert!(score.is_position());
//! assert_eq!(score.total(), 2.0);
//! ```

use std::fmt;

use serde::Serialize;

use crate::{config::HeuristicParams, placement_analysis::PlacementAnalysis};

/// Term breakdown of a hole-free board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PositionScore {
    pub holes: f32,
    pub roughness: f32,
    pub well_clear: f32,
    pub min_height: f32,
    pub average_height: f32,
    pub valleys: f32,
    pub tetris: f32,
}

impl PositionScore {
    #[must_use]
    pub fn total(&self) -> f32 {
        self.holes
            + self.roughness
            + self.well_clear
            + self.min_height
            + self.average_height
            + self.valleys
            + self.tetris
    }
}

/// Term breakdown of a board with holes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BurnScore {
    pub hole_row: f32,
    pub hole_depth: f32,
    pub hole_row_filled: f32,
    pub roughness: f32,
    pub max_height: f32,
    pub valleys: f32,
    /// Subtracted from the sum of the other terms.
    pub offset: f32,
}

impl BurnScore {
    #[must_use]
    pub fn total(&self) -> f32 {
        self.hole_row
            + self.hole_depth
            + self.hole_row_filled
            + self.roughness
            + self.max_height
            + self.valleys
            - self.offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, derive_more::IsVariant)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Score {
    Position(PositionScore),
    Burn(BurnScore),
}

impl Score {
    #[must_use]
    pub fn total(&self) -> f32 {
        match self {
            Score::Position(score) => score.total(),
            Score::Burn(score) => score.total(),
        }
    }
}

/// Scores a single placement (higher is better).
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    fn evaluate_placement(&self, analysis: &PlacementAnalysis<'_>) -> Score;
}

#[expect(clippy::cast_precision_loss)]
fn count(n: usize) -> f32 {
    n as f32
}

/// `(min, max)` of `weight * value` for `value` in `lo..=hi`.
fn span(weight: f32, lo: f32, hi: f32) -> (f32, f32) {
    let (a, b) = (weight * lo, weight * hi);
    (a.min(b), a.max(b))
}

/// The two-mode hand-tuned heuristic.
#[derive(Debug, Clone)]
pub struct HeuristicEvaluator {
    params: HeuristicParams,
}

impl HeuristicEvaluator {
    #[must_use]
    pub fn new(params: HeuristicParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &HeuristicParams {
        &self.params
    }

    #[must_use]
    pub fn position_score(&self, analysis: &PlacementAnalysis<'_>) -> PositionScore {
        let params = &self.params;
        let weights = &params.position;
        let board = analysis.board_analysis();
        let well = analysis.well();

        let min_height = board
            .min_height_excluding(well)
            .unwrap_or(usize::MAX)
            .min(params.min_height_cap);
        let average_height = board.average_height();
        let average_height = if average_height >= params.average_height_threshold {
            average_height
        } else {
            0.0
        };

        PositionScore {
            holes: weights.holes * count(board.num_holes()),
            roughness: weights.roughness * count(board.roughness(params.roughness_threshold)),
            well_clear: if board.is_column_clear(well) {
                weights.well_clear
            } else {
                0.0
            },
            min_height: weights.min_height * count(min_height),
            average_height: weights.average_height * average_height,
            valleys: weights.valleys * count(board.valleys(params.valley_threshold, well)),
            tetris: if analysis.cleared_rows() >= 4 {
                weights.tetris
            } else {
                0.0
            },
        }
    }

    #[must_use]
    pub fn burn_score(&self, analysis: &PlacementAnalysis<'_>) -> BurnScore {
        let params = &self.params;
        let weights = &params.burn;
        let board = analysis.board_analysis();
        let grid = board.grid();
        let hole_row = board.highest_hole_row().unwrap_or(0);
        let max_height = board.max_height();

        BurnScore {
            hole_row: weights.hole_row * count(hole_row + 1),
            hole_depth: weights.hole_depth * count(board.hole_depth(hole_row)),
            hole_row_filled: weights.hole_row_filled * count(board.row_filled(hole_row)),
            roughness: weights.roughness * count(board.roughness(params.roughness_threshold)),
            max_height: weights.max_height_squared * count(max_height * max_height),
            valleys: weights.valleys * count(board.valleys(params.valley_threshold, analysis.well())),
            offset: self.burn_offset(grid.height(), grid.width()),
        }
    }

    /// Offset subtracted from burn totals on a `height` x `width` grid.
    ///
    /// At least the configured offset, and always more than the gap between
    /// the highest possible burn sum and the lowest possible position total.
    #[must_use]
    pub fn burn_offset(&self, height: usize, width: usize) -> f32 {
        let (h, w) = (count(height), count(width));
        let position = &self.params.position;
        let burn = &self.params.burn;
        let min_height_cap = count(self.params.min_height_cap.min(height));

        let position_floor: f32 = [
            span(position.roughness, 0.0, (w - 1.0) * h),
            span(position.well_clear, 0.0, 1.0),
            span(position.min_height, 0.0, min_height_cap),
            span(position.average_height, 0.0, h),
            span(position.valleys, 0.0, w),
            span(position.tetris, 0.0, 1.0),
        ]
        .iter()
        .map(|(lo, _)| lo)
        .sum();
        let burn_ceiling: f32 = [
            span(burn.hole_row, 1.0, h),
            span(burn.hole_depth, 0.0, w * h),
            span(burn.hole_row_filled, 0.0, w),
            span(burn.roughness, 0.0, (w - 1.0) * h),
            span(burn.max_height_squared, 0.0, h * h),
            span(burn.valleys, 0.0, w),
        ]
        .iter()
        .map(|(_, hi)| hi)
        .sum();

        self.params
            .burn_offset
            .max(burn_ceiling - position_floor + 1.0)
    }
}

impl Default for HeuristicEvaluator {
    fn default() -> Self {
        Self::new(HeuristicParams::default())
    }
}

impl PlacementEvaluator for HeuristicEvaluator {
    fn evaluate_placement(&self, analysis: &PlacementAnalysis<'_>) -> Score {
        if analysis.board_analysis().num_holes() == 0 {
            Score::Position(self.position_score(analysis))
        } else {
            Score::Burn(self.burn_score(analysis))
        }
    }
}
