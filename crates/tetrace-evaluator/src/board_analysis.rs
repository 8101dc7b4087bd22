//! Lazily computed grid metrics.
//!
//! [`BoardAnalysis`] wraps a grid and computes each metric on first use, so a
//! hole-free board never pays for the burn-mode measurements and vice versa.

use std::cell::OnceCell;

use tetrace_engine::Grid;

#[derive(Debug)]
pub struct BoardAnalysis<'a> {
    grid: &'a Grid,
    upper_heights: OnceCell<Vec<usize>>,
    surface: OnceCell<Vec<isize>>,
    num_holes: OnceCell<usize>,
    highest_hole_row: OnceCell<Option<usize>>,
    max_height: OnceCell<usize>,
    average_height: OnceCell<f32>,
}

impl<'a> BoardAnalysis<'a> {
    #[must_use]
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            upper_heights: OnceCell::new(),
            surface: OnceCell::new(),
            num_holes: OnceCell::new(),
            highest_hole_row: OnceCell::new(),
            max_height: OnceCell::new(),
            average_height: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    fn is_hole(&self, row: usize, col: usize) -> bool {
        row + 1 < self.grid.height()
            && !self.grid.is_filled(row, col)
            && self.grid.is_filled(row + 1, col)
    }

    /// One above the topmost filled cell of each column (0 for an empty column).
    #[must_use]
    pub fn upper_heights(&self) -> &[usize] {
        self.upper_heights.get_or_init(|| {
            (0..self.grid.width())
                .map(|col| {
                    (0..self.grid.height())
                        .rev()
                        .find(|&row| self.grid.is_filled(row, col))
                        .map_or(0, |row| row + 1)
                })
                .collect()
        })
    }

    /// Height difference from each column to the next one to its right.
    #[must_use]
    pub fn surface(&self) -> &[isize] {
        self.surface.get_or_init(|| {
            self.upper_heights()
                .windows(2)
                .map(|w| {
                    #[expect(clippy::cast_possible_wrap)]
                    let delta = w[1] as isize - w[0] as isize;
                    delta
                })
                .collect()
        })
    }

    /// Sum of the height differences between adjacent columns that are at
    /// least `threshold`.
    #[must_use]
    pub fn roughness(&self, threshold: usize) -> usize {
        self.surface()
            .iter()
            .map(|delta| delta.unsigned_abs())
            .filter(|&delta| delta >= threshold)
            .sum()
    }

    /// Number of empty cells with a filled cell directly above.
    ///
    /// Each such cell counts, so a column can contribute several holes.
    #[must_use]
    pub fn num_holes(&self) -> usize {
        *self.num_holes.get_or_init(|| {
            (0..self.grid.height())
                .flat_map(|row| (0..self.grid.width()).map(move |col| (row, col)))
                .filter(|&(row, col)| self.is_hole(row, col))
                .count()
        })
    }

    /// The topmost row that contains a hole.
    #[must_use]
    pub fn highest_hole_row(&self) -> Option<usize> {
        *self.highest_hole_row.get_or_init(|| {
            (0..self.grid.height())
                .rev()
                .find(|&row| (0..self.grid.width()).any(|col| self.is_hole(row, col)))
        })
    }

    /// Filled cells stacked above the holes of `row`.
    #[must_use]
    pub fn hole_depth(&self, row: usize) -> usize {
        (0..self.grid.width())
            .filter(|&col| self.is_hole(row, col))
            .map(|col| {
                (row + 1..self.grid.height())
                    .filter(|&r| self.grid.is_filled(r, col))
                    .count()
            })
            .sum()
    }

    #[must_use]
    pub fn row_filled(&self, row: usize) -> usize {
        self.grid.row(row).iter().filter(|&&id| id != Grid::EMPTY).count()
    }

    /// Whether the column has no filled cell at all. Columns outside the grid
    /// are never clear.
    #[must_use]
    pub fn is_column_clear(&self, col: usize) -> bool {
        self.upper_heights().get(col) == Some(&0)
    }

    /// Columns whose surface drops by more than `threshold` on both sides.
    ///
    /// The edge columns only need the one inner neighbour. `well` is never
    /// counted as a valley, and a wall formed by the well does not make its
    /// neighbour one.
    #[must_use]
    pub fn valleys(&self, threshold: usize, well: usize) -> usize {
        #[expect(clippy::cast_possible_wrap)]
        let threshold = threshold as isize;
        let surface = self.surface();
        let Some(last) = surface.len().checked_sub(1) else {
            return 0;
        };
        // right wall of `col` is `surface[col]`, left wall is `surface[col - 1]`
        let right_wall = |col: usize| col + 1 != well && surface[col] > threshold;
        let left_wall = |col: usize| col - 1 != well && surface[col - 1] < -threshold;

        let mut valleys = 0;
        if well != 0 && right_wall(0) {
            valleys += 1;
        }
        for col in 1..surface.len() {
            if col != well && right_wall(col) && left_wall(col) {
                valleys += 1;
            }
        }
        if well != last + 1 && left_wall(last + 1) {
            valleys += 1;
        }
        valleys
    }

    /// Lowest column height, ignoring `well`. `None` when `well` is the only
    /// column.
    #[must_use]
    pub fn min_height_excluding(&self, well: usize) -> Option<usize> {
        self.upper_heights()
            .iter()
            .enumerate()
            .filter(|&(col, _)| col != well)
            .map(|(_, &h)| h)
            .min()
    }

    #[must_use]
    pub fn max_height(&self) -> usize {
        *self
            .max_height
            .get_or_init(|| self.upper_heights().iter().copied().max().unwrap_or(0))
    }

    #[must_use]
    pub fn average_height(&self) -> f32 {
        *self.average_height.get_or_init(|| {
            let heights = self.upper_heights();
            #[expect(clippy::cast_precision_loss)]
            let average = heights.iter().sum::<usize>() as f32 / heights.len() as f32;
            average
        })
    }

    /// The rightmost column without any filled cell.
    #[must_use]
    pub fn rightmost_empty_column(&self) -> Option<usize> {
        self.upper_heights().iter().rposition(|&h| h == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(art: &str) -> Grid {
        Grid::from_ascii(art).unwrap()
    }

    #[test]
    fn test_example_grid_metrics() {
        let grid = grid(
            r"
            ....
            ....
            ##..
            ###.
            ",
        );
        let analysis = BoardAnalysis::new(&grid);
        assert_eq!(analysis.upper_heights(), &[2, 2, 1, 0]);
        assert_eq!(analysis.surface(), &[0, -1, -1]);
        assert_eq!(analysis.roughness(0), 2);
        assert_eq!(analysis.roughness(2), 0);
        assert_eq!(analysis.num_holes(), 0);
        assert_eq!(analysis.highest_hole_row(), None);
        assert!(analysis.is_column_clear(3));
        assert!(!analysis.is_column_clear(2));
        assert!(!analysis.is_column_clear(4));
        assert_eq!(analysis.min_height_excluding(3), Some(1));
        assert_eq!(analysis.max_height(), 2);
        assert!((analysis.average_height() - 1.25).abs() < f32::EPSILON);
        assert_eq!(analysis.rightmost_empty_column(), Some(3));
    }

    #[test]
    fn test_holes_counted_per_cell() {
        let grid = grid(
            r"
            .#...
            .#.#.
            ...#.
            .#.##
            ",
        );
        let analysis = BoardAnalysis::new(&grid);
        // only (1, 1) has a block directly above it
        assert_eq!(analysis.num_holes(), 1);
        assert_eq!(analysis.highest_hole_row(), Some(1));
        assert_eq!(analysis.hole_depth(1), 2);
        assert_eq!(analysis.row_filled(1), 1);
    }

    #[test]
    fn test_stacked_holes_and_depth() {
        let grid = grid(
            r"
            #...
            .#..
            #.#.
            ....
            ",
        );
        let analysis = BoardAnalysis::new(&grid);
        // (2,0) under (3,0); (1,1) under (2,1); (0,0) under (1,0); (0,2) under (1,2)
        assert_eq!(analysis.num_holes(), 4);
        assert_eq!(analysis.highest_hole_row(), Some(2));
        assert_eq!(analysis.hole_depth(2), 1);
        // col 0 has two blocks above row 0, col 2 has one
        assert_eq!(analysis.hole_depth(0), 3);
        assert_eq!(analysis.row_filled(1), 2);
        assert_eq!(analysis.upper_heights(), &[4, 3, 2, 0]);
        assert_eq!(analysis.rightmost_empty_column(), Some(3));
    }

    #[test]
    fn test_valleys() {
        let grid = grid(
            r"
            #...#.....
            #...#.....
            #.#.#.....
            ###.#...#.
            ",
        );
        let analysis = BoardAnalysis::new(&grid);
        assert_eq!(analysis.upper_heights(), &[4, 1, 2, 0, 4, 0, 0, 0, 1, 0]);
        // col 3 drops 2 on the left and 4 on the right
        assert_eq!(analysis.valleys(2, 9), 0);
        assert_eq!(analysis.valleys(1, 9), 1);
        assert_eq!(analysis.valleys(1, 3), 0);
    }

    #[test]
    fn test_edge_valleys_and_well() {
        let grid = grid(
            r"
            .###.
            .###.
            .###.
            .###.
            ",
        );
        let analysis = BoardAnalysis::new(&grid);
        assert_eq!(analysis.valleys(2, 4), 1);
        assert_eq!(analysis.valleys(2, 0), 1);
        assert_eq!(analysis.valleys(2, 2), 2);
        assert_eq!(analysis.valleys(3, 2), 2);
        assert_eq!(analysis.valleys(4, 2), 0);
        assert_eq!(analysis.min_height_excluding(0), Some(0));
        assert_eq!(analysis.rightmost_empty_column(), Some(4));
    }

    #[test]
    fn test_well_does_not_form_valley_walls() {
        let grid = grid(
            r"
            ....#
            ....#
            ..#.#
            ..#.#
            ..#.#
            ",
        );
        let analysis = BoardAnalysis::new(&grid);
        assert_eq!(analysis.upper_heights(), &[0, 0, 3, 0, 5]);
        // col 3 sits between col 2 and the tall well
        assert_eq!(analysis.valleys(2, 4), 0);
        assert_eq!(analysis.valleys(2, 0), 1);

        let grid = self::grid(
            r"
            .#..
            .#..
            .#..
            .#..
            ",
        );
        let analysis = BoardAnalysis::new(&grid);
        // the edge column only has the well as its wall
        assert_eq!(analysis.valleys(2, 1), 0);
        assert_eq!(analysis.valleys(2, 3), 1);
    }

    #[test]
    fn test_single_column() {
        let grid = grid("#\n.");
        let analysis = BoardAnalysis::new(&grid);
        assert_eq!(analysis.num_holes(), 1);
        assert_eq!(analysis.roughness(0), 0);
        assert_eq!(analysis.valleys(0, 0), 0);
        assert_eq!(analysis.min_height_excluding(0), None);
        assert_eq!(analysis.rightmost_empty_column(), None);
    }
}
