use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{GridSizeError, core::piece::Coord};

/// A filled cell reported by [`Grid::filled_blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledBlock {
    pub row: usize,
    pub col: usize,
    pub id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseGridError {
    #[display("grid text contains no rows")]
    Empty,
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("unexpected character {ch:?} in row {row}")]
    InvalidCell { row: usize, ch: char },
}

/// Fixed-size cell matrix.
///
/// Cells are stored row-major in a flat vector (`index = row * width + col`).
/// Row 0 is the floor and rows grow upward, so the ceiling is row `height - 1`.
/// Each cell is either [`Grid::EMPTY`] or the id of the piece type that filled it.
///
/// Coordinates handed in by pieces are signed: a piece may hang below the floor
/// or above the ceiling while it is being tested. Writes outside the grid are
/// ignored; collision checks treat the sides and the floor as solid and the
/// space above the ceiling as open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<u8>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            height: Self::DEFAULT_HEIGHT,
            width: Self::DEFAULT_WIDTH,
            cells: vec![Self::EMPTY; Self::DEFAULT_HEIGHT * Self::DEFAULT_WIDTH],
        }
    }
}

impl Grid {
    pub const DEFAULT_HEIGHT: usize = 20;
    pub const DEFAULT_WIDTH: usize = 10;

    pub const EMPTY: u8 = 0;
    /// Cell id used for filled cells that did not come from a known piece
    /// (`#` in the text form).
    pub const BLOCK: u8 = 8;

    pub fn new(height: usize, width: usize) -> Result<Self, GridSizeError> {
        if height == 0 || width == 0 {
            return Err(GridSizeError { height, width });
        }
        Ok(Self {
            height,
            width,
            cells: vec![Self::EMPTY; height * width],
        })
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    #[inline]
    fn checked_index(&self, coord: Coord) -> Option<usize> {
        let row = usize::try_from(coord.row)
            .ok()
            .filter(|r| *r < self.height)?;
        let col = usize::try_from(coord.col)
            .ok()
            .filter(|c| *c < self.width)?;
        Some(self.index(row, col))
    }

    #[must_use]
    pub fn in_bounds(&self, coord: Coord) -> bool {
        self.checked_index(coord).is_some()
    }

    /// Returns the id stored at `(row, col)`.
    ///
    /// Only valid for in-bounds coordinates.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        debug_assert!(
            row < self.height && col < self.width,
            "cell ({row}, {col}) outside {}x{} grid",
            self.height,
            self.width
        );
        self.cells[self.index(row, col)]
    }

    #[must_use]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.get(row, col) != Self::EMPTY
    }

    /// Writes `id` into the cell. Out-of-bounds coordinates are ignored.
    pub fn fill(&mut self, coord: Coord, id: u8) {
        if let Some(i) = self.checked_index(coord) {
            self.cells[i] = id;
        }
    }

    pub fn fill_set(&mut self, coords: &[Coord], id: u8) {
        for &coord in coords {
            self.fill(coord, id);
        }
    }

    pub fn clear_set(&mut self, coords: &[Coord]) {
        self.fill_set(coords, Self::EMPTY);
    }

    /// Returns `true` if any coordinate is past a side wall, below the floor,
    /// or on a filled cell.
    ///
    /// Coordinates above the ceiling never collide on their own.
    #[must_use]
    pub fn collision_check(&self, coords: &[Coord]) -> bool {
        coords.iter().any(|&coord| {
            let outside_sides = usize::try_from(coord.col).map_or(true, |col| col >= self.width);
            if coord.row < 0 || outside_sides {
                return true;
            }
            self.checked_index(coord)
                .is_some_and(|i| self.cells[i] != Self::EMPTY)
        })
    }

    /// Returns the cells of one row, left to right.
    #[must_use]
    pub fn row(&self, row: usize) -> &[u8] {
        &self.cells[self.index(row, 0)..][..self.width]
    }

    /// Iterates rows from the floor upward.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[u8]> + '_ {
        self.cells.chunks_exact(self.width)
    }

    #[must_use]
    pub fn is_row_filled(&self, row: usize) -> bool {
        self.row(row).iter().all(|&cell| cell != Self::EMPTY)
    }

    /// Returns the indices of every completely filled row, lowest first.
    #[must_use]
    pub fn filled_rows(&self) -> Vec<usize> {
        (0..self.height)
            .filter(|&row| self.is_row_filled(row))
            .collect()
    }

    /// Removes the given rows in a single pass.
    ///
    /// Each surviving row falls by the number of removed rows beneath it and the
    /// rows vacated at the top become empty. The set does not need to be sorted
    /// or contiguous; indices outside the grid are ignored.
    pub fn clear_rows(&mut self, rows: &[usize]) {
        if rows.is_empty() {
            return;
        }
        let mut removed = vec![false; self.height];
        for &row in rows {
            if let Some(flag) = removed.get_mut(row) {
                *flag = true;
            }
        }

        let width = self.width;
        let mut dst = 0;
        for src in 0..self.height {
            if removed[src] {
                continue;
            }
            if dst != src {
                self.cells
                    .copy_within(src * width..(src + 1) * width, dst * width);
            }
            dst += 1;
        }
        self.cells[dst * width..].fill(Self::EMPTY);
    }

    /// Returns every non-empty cell in row-major order.
    #[must_use]
    pub fn filled_blocks(&self) -> Vec<FilledBlock> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &id)| id != Self::EMPTY)
            .map(|(i, &id)| FilledBlock {
                row: i / self.width,
                col: i % self.width,
                id,
            })
            .collect()
    }

    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&id| id != Self::EMPTY).count()
    }

    pub fn reset(&mut self) {
        self.cells.fill(Self::EMPTY);
    }

    /// Parses a grid from its text form.
    ///
    /// Lines are given top to bottom, so the last line is row 0. `.` is an
    /// empty cell, `#` is [`Grid::BLOCK`] and a digit `1`-`9` is that id.
    /// Blank lines and surrounding whitespace are ignored.
    pub fn from_ascii(art: &str) -> Result<Self, ParseGridError> {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(ParseGridError::Empty);
        };
        let height = lines.len();
        let width = first.chars().count();

        let mut cells = vec![Self::EMPTY; height * width];
        for (i, line) in lines.iter().enumerate() {
            let row = height - 1 - i;
            let found = line.chars().count();
            if found != width {
                return Err(ParseGridError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let id = match ch {
                    '.' => Self::EMPTY,
                    '#' => Self::BLOCK,
                    '1'..='9' => ch
                        .to_digit(10)
                        .and_then(|d| u8::try_from(d).ok())
                        .unwrap_or(Self::BLOCK),
                    _ => return Err(ParseGridError::InvalidCell { row, ch }),
                };
                cells[row * width + col] = id;
            }
        }
        Ok(Self {
            height,
            width,
            cells,
        })
    }

    fn cell_char(id: u8) -> char {
        match id {
            Self::EMPTY => '.',
            Self::BLOCK => '#',
            1..=9 => char::from(b'0' + id),
            _ => '?',
        }
    }

    fn text_rows(&self) -> impl Iterator<Item = String> + '_ {
        self.rows()
            .rev()
            .map(|row| row.iter().map(|&id| Self::cell_char(id)).collect())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.text_rows() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl Serialize for Grid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: ["..........", ..., "###.######"] (top row first)
        serializer.collect_seq(self.text_rows())
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        Grid::from_ascii(&rows.join("\n")).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: i32, col: i32) -> Coord {
        Coord::new(row, col)
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert!(Grid::new(0, 10).is_err());
        assert!(Grid::new(20, 0).is_err());
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!((grid.height(), grid.width()), (4, 3));
        assert_eq!(grid.filled_count(), 0);
    }

    #[test]
    fn test_fill_ignores_out_of_bounds() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.fill_set(&[c(4, 0), c(-1, 2), c(0, 4), c(1, 1)], 3);
        assert_eq!(grid.filled_count(), 1);
        assert_eq!(grid.get(1, 1), 3);

        grid.clear_set(&[c(1, 1), c(7, 7)]);
        assert_eq!(grid.filled_count(), 0);
    }

    #[test]
    fn test_collision_check_bounds_and_occupancy() {
        let grid = Grid::from_ascii(
            r"
            ....
            ....
            .#..
            ....
            ",
        )
        .unwrap();

        assert!(!grid.collision_check(&[c(0, 0), c(3, 3)]));
        assert!(grid.collision_check(&[c(1, 1)]));
        assert!(grid.collision_check(&[c(-1, 0)]));
        assert!(grid.collision_check(&[c(2, -1)]));
        assert!(grid.collision_check(&[c(2, 4)]));
    }

    #[test]
    fn test_collision_check_open_above_ceiling() {
        let full = Grid::from_ascii(
            r"
            ####
            ####
            ",
        )
        .unwrap();
        assert!(!full.collision_check(&[c(2, 0), c(10, 3), c(3, 1)]));
        assert!(full.collision_check(&[c(10, 4)]));
    }

    #[test]
    fn test_filled_rows_require_every_column() {
        let grid = Grid::from_ascii(
            r"
            ####
            ##.#
            1234
            ",
        )
        .unwrap();
        assert_eq!(grid.filled_rows(), vec![0, 2]);
    }

    #[test]
    fn test_clear_rows_non_contiguous() {
        let mut grid = Grid::from_ascii(
            r"
            ...5
            ####
            ..3.
            ####
            1...
            ",
        )
        .unwrap();
        let before = grid.filled_count();
        let rows = grid.filled_rows();
        assert_eq!(rows, vec![1, 3]);

        grid.clear_rows(&rows);
        assert_eq!(grid.filled_count(), before - rows.len() * grid.width());
        let expected = Grid::from_ascii(
            r"
            ....
            ....
            ...5
            ..3.
            1...
            ",
        )
        .unwrap();
        assert_eq!(grid, expected);
        assert!(grid.filled_rows().is_empty());
    }

    #[test]
    fn test_clear_rows_unsorted_input() {
        let mut a = Grid::from_ascii(
            r"
            #...
            ####
            .#..
            ####
            ",
        )
        .unwrap();
        let mut b = a.clone();
        a.clear_rows(&[0, 2]);
        b.clear_rows(&[2, 0, 2]);
        assert_eq!(a, b);
        assert_eq!(a.row(0), &[0, Grid::BLOCK, 0, 0]);
        assert_eq!(a.row(1), &[Grid::BLOCK, 0, 0, 0]);
    }

    #[test]
    fn test_filled_blocks_row_major() {
        let grid = Grid::from_ascii(
            r"
            .7..
            2..3
            ",
        )
        .unwrap();
        let blocks = grid.filled_blocks();
        assert_eq!(
            blocks,
            vec![
                FilledBlock {
                    row: 0,
                    col: 0,
                    id: 2
                },
                FilledBlock {
                    row: 0,
                    col: 3,
                    id: 3
                },
                FilledBlock {
                    row: 1,
                    col: 1,
                    id: 7
                },
            ]
        );
    }

    #[test]
    fn test_from_ascii_errors() {
        assert_eq!(Grid::from_ascii("  \n"), Err(ParseGridError::Empty));
        assert!(matches!(
            Grid::from_ascii("...\n.."),
            Err(ParseGridError::RaggedRow { .. })
        ));
        assert!(matches!(
            Grid::from_ascii("..x"),
            Err(ParseGridError::InvalidCell { ch: 'x', .. })
        ));
    }

    #[test]
    fn test_grid_serialization() {
        let grid = Grid::from_ascii(
            r"
            ..#.
            15..
            ",
        )
        .unwrap();
        let serialized = serde_json::to_string(&grid).unwrap();
        assert_eq!(serialized, r#"["..#.","15.."]"#);

        let deserialized: Grid = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, grid);
        assert_eq!(grid.to_string(), "..#.\n15..\n");
    }

    #[test]
    fn test_reset() {
        let mut grid = Grid::from_ascii("##\n.#").unwrap();
        grid.reset();
        assert_eq!(grid.filled_count(), 0);
        assert_eq!((grid.height(), grid.width()), (2, 2));
    }
}
