//! A generated move together with the metrics of the board it leaves behind.

use crate::{board_analysis::BoardAnalysis, move_generator::GeneratedMove};

#[derive(Debug)]
pub struct PlacementAnalysis<'a> {
    generated: &'a GeneratedMove,
    well: usize,
    board_analysis: BoardAnalysis<'a>,
}

impl<'a> PlacementAnalysis<'a> {
    /// Analyzes `generated` with `well` as the column reserved for four-row
    /// clears.
    #[must_use]
    pub fn new(generated: &'a GeneratedMove, well: usize) -> Self {
        Self {
            generated,
            well,
            board_analysis: BoardAnalysis::new(generated.board.grid()),
        }
    }

    #[must_use]
    pub fn generated(&self) -> &'a GeneratedMove {
        self.generated
    }

    /// Rows cleared by this placement alone.
    #[must_use]
    pub fn cleared_rows(&self) -> usize {
        self.generated.cleared_rows
    }

    #[must_use]
    pub fn well(&self) -> usize {
        self.well
    }

    #[must_use]
    pub fn board_analysis(&self) -> &BoardAnalysis<'a> {
        &self.board_analysis
    }
}
