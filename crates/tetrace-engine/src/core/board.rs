use serde::{Deserialize, Serialize};

use crate::{
    GridSizeError,
    core::{grid::Grid, piece::Piece},
};

/// Number of line-clear kinds tracked by [`Board::line_type_count`]
/// (single, double, triple, four-row clear).
pub const LINE_TYPES: usize = 4;

/// A playfield: a [`Grid`] plus line-clear bookkeeping.
///
/// Boards are plain values. Cloning one copies the cells and the counters, so
/// a search can branch into many hypothetical futures without touching the
/// original.
///
/// # Example
///
/// ```
/// use tetrace_engine::{Board, Piece, PieceKind};
///
/// let mut board = Board::default();
/// let piece = Piece::at(PieceKind::I, 0, 2, 0);
/// assert_eq!(board.place_piece(&piece), 0);
/// assert_eq!(board.grid().filled_count(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    grid: Grid,
    line_count: usize,
    line_type_count: [usize; LINE_TYPES],
}

impl Board {
    pub fn new(height: usize, width: usize) -> Result<Self, GridSizeError> {
        Ok(Self::from_grid(Grid::new(height, width)?))
    }

    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        Self {
            grid,
            line_count: 0,
            line_type_count: [0; LINE_TYPES],
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Total number of rows cleared so far.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Histogram of clears: `[singles, doubles, triples, four-row clears]`.
    #[must_use]
    pub fn line_type_count(&self) -> &[usize; LINE_TYPES] {
        &self.line_type_count
    }

    /// Number of four-row clears so far.
    #[must_use]
    pub fn tetrises(&self) -> usize {
        self.line_type_count[LINE_TYPES - 1]
    }

    pub fn reset(&mut self) {
        self.grid.reset();
        self.line_count = 0;
        self.line_type_count = [0; LINE_TYPES];
    }

    /// Locks a piece into the grid and clears every row it completes.
    ///
    /// Writing the cells, updating the counters and collapsing the rows happen
    /// together. Cells above the ceiling are dropped. Returns the number of rows
    /// cleared.
    pub fn place_piece(&mut self, piece: &Piece) -> usize {
        self.grid.fill_set(piece.coords(), piece.data().id());
        let filled_rows = self.grid.filled_rows();
        let cleared = filled_rows.len();
        if cleared > 0 {
            self.line_count += cleared;
            self.line_type_count[cleared.min(LINE_TYPES) - 1] += 1;
            self.grid.clear_rows(&filled_rows);
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceKind;

    fn board(art: &str) -> Board {
        Board::from_grid(Grid::from_ascii(art).unwrap())
    }

    #[test]
    fn test_place_without_clear_only_writes_cells() {
        let mut board = Board::default();
        let piece = Piece::at(PieceKind::T, 1, 4, 0);
        assert_eq!(board.place_piece(&piece), 0);
        assert_eq!(board.line_count(), 0);
        assert_eq!(board.line_type_count(), &[0; LINE_TYPES]);
        for coord in piece.coords() {
            let (row, col) = (coord.row as usize, coord.col as usize);
            assert_eq!(board.grid().get(row, col), PieceKind::T.id());
        }
    }

    #[test]
    fn test_place_piece_clears_tetris() {
        let mut board = board(
            r"
            ..........
            #########.
            #########.
            #########.
            #########.
            ",
        );
        let piece = Piece::at(PieceKind::I, 1, 9, 1);
        assert_eq!(board.place_piece(&piece), 4);
        assert_eq!(board.line_count(), 4);
        assert_eq!(board.line_type_count(), &[0, 0, 0, 1]);
        assert_eq!(board.tetrises(), 1);
        assert_eq!(board.grid().filled_count(), 0);
    }

    #[test]
    fn test_place_piece_clears_split_rows() {
        let mut board = board(
            r"
            ....
            ###.
            #.#.
            ###.
            ",
        );
        // Vertical I in the last column completes rows 0 and 2 but not row 1.
        let piece = Piece::at(PieceKind::I, 1, 3, 1);
        assert_eq!(board.place_piece(&piece), 2);
        assert_eq!(board.line_type_count(), &[0, 1, 0, 0]);
        let expected = Grid::from_ascii(
            r"
            ....
            ....
            ...5
            #.#5
            ",
        )
        .unwrap();
        assert_eq!(board.grid(), &expected);
    }

    #[test]
    fn test_counters_accumulate_and_reset() {
        let mut board = board(
            r"
            ........
            ........
            ######..
            ",
        );
        assert_eq!(board.place_piece(&Piece::at(PieceKind::O, 1, 7, 0)), 1);
        assert_eq!(board.line_count(), 1);
        assert_eq!(board.line_type_count(), &[1, 0, 0, 0]);

        let snapshot = board.clone();
        board.reset();
        assert_eq!(board.line_count(), 0);
        assert_eq!(board.grid().filled_count(), 0);
        assert_eq!(snapshot.line_count(), 1);
        assert_eq!(snapshot.grid().filled_count(), 2);
    }

    #[test]
    fn test_cells_above_ceiling_are_dropped() {
        let mut board = Board::new(2, 4).unwrap();
        let piece = Piece::at(PieceKind::I, 1, 0, 1);
        assert_eq!(board.place_piece(&piece), 0);
        assert_eq!(board.grid().filled_count(), 2);
    }
}
