//! Evaluator configuration.
//!
//! Every knob of the search lives here: grid size, the movement timing model,
//! how the well column is chosen, and the heuristic thresholds and weights.
//! All structs deserialize with `#[serde(default)]`, so a config file only
//! needs the fields it changes:
//!
//! ```
//! use tetrace_evaluator::config::{EvaluatorConfig, WellSelection};
//!
//! let config: EvaluatorConfig = serde_json::from_str(
//!     r#"{ "timing": { "gravity": 2 }, "well": "rightmost-empty" }"#,
//! )
//! .unwrap();
//! assert_eq!(config.timing.gravity, 2);
//! assert_eq!(config.timing.auto_repeat, 5);
//! assert_eq!(config.well, WellSelection::RightmostEmpty);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use tetrace_engine::{Grid, GridSizeError};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("invalid grid size: {_0}")]
    GridSize(GridSizeError),
    #[display("entry column {column} is outside a {width}-wide grid")]
    EntryColumnOutOfRange { column: usize, width: usize },
    #[display("well column {column} is outside a {width}-wide grid")]
    WellColumnOutOfRange { column: usize, width: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub height: usize,
    pub width: usize,
    pub timing: Timing,
    pub well: WellSelection,
    pub heuristic: HeuristicParams,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            height: Grid::DEFAULT_HEIGHT,
            width: Grid::DEFAULT_WIDTH,
            timing: Timing::default(),
            well: WellSelection::default(),
            heuristic: HeuristicParams::default(),
        }
    }
}

impl EvaluatorConfig {
    /// Checks the values that cannot be expressed by the types alone.
    ///
    /// Zero auto-repeat delay and zero gravity are legal (one event per frame).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (height, width) = (self.height, self.width);
        if height == 0 || width == 0 {
            return Err(ConfigError::GridSize(GridSizeError { height, width }));
        }
        if self.timing.entry_column >= width {
            return Err(ConfigError::EntryColumnOutOfRange {
                column: self.timing.entry_column,
                width,
            });
        }
        if let WellSelection::Fixed(column) = self.well
            && column >= width
        {
            return Err(ConfigError::WellColumnOutOfRange { column, width });
        }
        Ok(())
    }

    /// Row the piece pivot occupies when it enters play.
    #[must_use]
    pub fn entry_row(&self) -> usize {
        self.height.saturating_sub(1)
    }
}

/// Movement timing, in frames.
///
/// Both delays count idle frames between two events, so a value of `n` means
/// one event every `n + 1` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Frames between lateral steps while a direction is held (D).
    pub auto_repeat: usize,
    /// Frames between gravity drops (G).
    pub gravity: usize,
    /// Column of the pivot when a piece enters play.
    pub entry_column: usize,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            auto_repeat: 5,
            gravity: 0,
            entry_column: 5,
        }
    }
}

/// How the column reserved for four-row clears is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WellSelection {
    /// The rightmost column of the grid.
    #[default]
    LastColumn,
    /// A fixed column index.
    Fixed(usize),
    /// The rightmost completely empty column; when every column has a block,
    /// the previous well is kept.
    RightmostEmpty,
}

/// Thresholds and weights of the placement heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicParams {
    /// Height differences below this are ignored by roughness (`|Δ| >= threshold` counts).
    pub roughness_threshold: usize,
    /// A valley needs both neighbouring steps to exceed this (`|Δ| > threshold`).
    pub valley_threshold: usize,
    /// The minimum-height reward stops growing at this height.
    pub min_height_cap: usize,
    /// Average height starts being penalized at this height (inclusive).
    pub average_height_threshold: f32,
    /// Constant subtracted from every burn-mode total. Raised automatically
    /// when the weights would let a burn score reach a position score.
    pub burn_offset: f32,
    pub position: PositionWeights,
    pub burn: BurnWeights,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self {
            roughness_threshold: 2,
            valley_threshold: 2,
            min_height_cap: 10,
            average_height_threshold: 10.0,
            burn_offset: 1000.0,
            position: PositionWeights::default(),
            burn: BurnWeights::default(),
        }
    }
}

/// Weights used for hole-free boards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionWeights {
    pub holes: f32,
    pub roughness: f32,
    pub well_clear: f32,
    pub min_height: f32,
    pub average_height: f32,
    pub valleys: f32,
    pub tetris: f32,
}

impl Default for PositionWeights {
    fn default() -> Self {
        Self {
            holes: -10.0,
            roughness: -0.25,
            well_clear: 1.0,
            min_height: 1.0,
            average_height: -1.0,
            valleys: -5.0,
            tetris: 20.0,
        }
    }
}

/// Weights used for boards with at least one hole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnWeights {
    /// Applied to `highest hole row + 1`.
    pub hole_row: f32,
    pub hole_depth: f32,
    pub hole_row_filled: f32,
    pub roughness: f32,
    pub max_height_squared: f32,
    pub valleys: f32,
}

impl Default for BurnWeights {
    fn default() -> Self {
        Self {
            hole_row: -20.0,
            hole_depth: -1.0,
            hole_row_filled: 1.0,
            roughness: -0.25,
            max_height_squared: -0.5,
            valleys: -5.0,
        }
    }
}
