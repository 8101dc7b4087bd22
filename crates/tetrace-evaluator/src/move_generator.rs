//! Materializes reachable placements into candidate boards.

use tetrace_engine::{Board, Piece};

use crate::{
    config::Timing,
    reachability::{Placement, ReachabilityAnalyzer},
};

/// A board after one hypothetical placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMove {
    pub placement: Placement,
    pub piece: Piece,
    pub board: Board,
    pub cleared_rows: usize,
}

#[derive(Debug, Clone)]
pub struct MoveGenerator {
    analyzer: ReachabilityAnalyzer,
}

impl MoveGenerator {
    #[must_use]
    pub fn new(timing: Timing) -> Self {
        Self {
            analyzer: ReachabilityAnalyzer::new(timing),
        }
    }

    #[must_use]
    pub fn analyzer(&self) -> &ReachabilityAnalyzer {
        &self.analyzer
    }

    pub fn set_gravity(&mut self, gravity: usize) {
        self.analyzer.set_gravity(gravity);
    }

    /// Places `piece` at every reachable position on a copy of `board`.
    ///
    /// Only the piece kind matters; it always enters at the configured entry
    /// position. Identical boards reached from different placements are kept
    /// apart.
    #[must_use]
    pub fn generate(&self, board: &Board, piece: &Piece) -> Vec<GeneratedMove> {
        self.analyzer
            .placements(board.grid(), piece.kind())
            .into_iter()
            .map(|placement| {
                #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let (row, col) = (placement.row as i32, placement.col as i32);
                let mut piece = *piece;
                piece.set_position(row, col, placement.orientation);
                let mut board = board.clone();
                let cleared_rows = board.place_piece(&piece);
                GeneratedMove {
                    placement,
                    piece,
                    board,
                    cleared_rows,
                }
            })
            .collect()
    }
}
