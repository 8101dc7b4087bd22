//! Reachable final positions under the game's movement timing.
//!
//! A piece enters at `(entry_row, entry_column)` and can only move sideways at
//! the auto-repeat rate while gravity pulls it down. Far columns are therefore
//! out of reach at low gravity values, and a tall stack next to the entry
//! column shortens the time available to get past it.
//!
//! The analysis runs in three steps:
//!
//! 1. [`CollisionMap`] - for each orientation, which pivot cells collide and
//!    where each column's vertical fall ends (the *landing row*)
//! 2. [`ReachabilityAnalyzer::accessible_columns`] - which columns the pivot can
//!    reach before the piece locks, scanning left and right from the entry
//!    column and stopping at the first failure in each direction
//! 3. [`ReachabilityAnalyzer::placements`] - the resting cells that are
//!    actually reachable: a landing cell, a cell slid into from a neighbouring
//!    column, or a cell reached by one more rotation
//!
//! # Timing model
//!
//! With gravity `G` and auto-repeat delay `D`, the piece falls one row on every
//! `G + 1`-th frame and makes its `k`-th lateral step on frame
//! `1 + (k - 1)(D + 1)`. A column with landing row `L` allows
//! `(entry_row - L + 1)(G + 1)` frames before the lock. A column is accessible
//! when that budget covers the step frame both for the column and for the one
//! the piece passes over on its way there. Ties count as reachable.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use tetrace_engine::{Coord, Grid, PieceKind};

use crate::config::Timing;

/// Highest orientation count among the piece kinds.
pub const MAX_ORIENTATIONS: usize = 4;

/// A final rest position of the piece pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Placement {
    pub row: usize,
    pub col: usize,
    pub orientation: u8,
}

/// Collision data for one piece orientation on one grid.
///
/// Covers pivot rows `-1..=height`. Row `-1` always collides (the pivot cell
/// is below the floor), so every column has a topmost colliding row.
#[derive(Debug, Clone)]
pub struct CollisionMap {
    height: usize,
    width: usize,
    colliding: Vec<bool>,
    landing: Vec<Option<usize>>,
}

impl CollisionMap {
    /// Builds the map for `kind` in `orientation`.
    ///
    /// `entry_row` bounds the landing rows: a column whose fall would end above
    /// the entry row cannot be entered from above and gets no landing row.
    #[must_use]
    pub fn new(grid: &Grid, kind: PieceKind, orientation: u8, entry_row: usize) -> Self {
        let (height, width) = (grid.height(), grid.width());
        let offsets = kind.data().offsets(orientation);
        let rows = height + 2;

        let mut colliding = vec![false; rows * width];
        for (i, collides) in colliding.iter_mut().enumerate() {
            let center = Coord::new(Self::signed_row(i / width), Self::signed_col(i % width));
            let coords = offsets.map(|offset| center.offset(offset.row, offset.col));
            *collides = grid.collision_check(&coords);
        }

        let landing = (0..width)
            .map(|col| {
                // row index `r` in `colliding` is pivot row `r - 1`
                let top = (0..rows)
                    .rev()
                    .find(|&r| colliding[r * width + col])
                    .unwrap_or(0);
                Some(top).filter(|&landing| landing <= entry_row)
            })
            .collect();

        Self {
            height,
            width,
            colliding,
            landing,
        }
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn signed_row(index: usize) -> i32 {
        index as i32 - 1
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn signed_col(index: usize) -> i32 {
        index as i32
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the piece collides with its pivot at `(row, col)`, for
    /// `0 <= row <= height`.
    #[must_use]
    pub fn collides(&self, row: usize, col: usize) -> bool {
        self.colliding[(row + 1) * self.width + col]
    }

    /// A free cell directly above a colliding one: somewhere the piece locks.
    #[must_use]
    pub fn is_resting(&self, row: usize, col: usize) -> bool {
        // row `r - 1` of the map is stored at index `r`
        !self.collides(row, col) && self.colliding[row * self.width + col]
    }

    /// Row where a piece dropped straight down this column comes to rest.
    #[must_use]
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        self.landing[col]
    }
}

/// Finds reachable placements for a piece on a grid.
///
/// # Example
///
/// ```
/// use tetrace_engine::{Grid, PieceKind};
/// use tetrace_evaluator::{config::Timing, reachability::ReachabilityAnalyzer};
///
/// let analyzer = ReachabilityAnalyzer::new(Timing {
///     auto_repeat: 0,
///     gravity: 0,
///     entry_column: 5,
/// });
/// let placements = analyzer.placements(&Grid::default(), PieceKind::I);
/// assert_eq!(placements.len(), 17);
/// ```
#[derive(Debug, Clone)]
pub struct ReachabilityAnalyzer {
    timing: Timing,
}

impl ReachabilityAnalyzer {
    #[must_use]
    pub fn new(timing: Timing) -> Self {
        Self { timing }
    }

    #[must_use]
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn set_gravity(&mut self, gravity: usize) {
        self.timing.gravity = gravity;
    }

    /// One collision map per orientation of `kind`.
    #[must_use]
    pub fn collision_maps(
        &self,
        grid: &Grid,
        kind: PieceKind,
    ) -> ArrayVec<CollisionMap, MAX_ORIENTATIONS> {
        let entry_row = grid.height() - 1;
        (0..kind.num_orientations())
            .map(|orientation| CollisionMap::new(grid, kind, orientation, entry_row))
            .collect()
    }

    fn frames_until_lock(&self, map: &CollisionMap, col: usize) -> Option<usize> {
        let entry_row = map.height() - 1;
        map.landing_row(col).map(|landing| {
            (entry_row - landing + 1).saturating_mul(self.timing.gravity.saturating_add(1))
        })
    }

    fn step_frame(&self, steps: usize) -> usize {
        (steps - 1)
            .saturating_mul(self.timing.auto_repeat.saturating_add(1))
            .saturating_add(1)
    }

    /// Columns the pivot can reach in this orientation before the piece locks.
    ///
    /// Empty when the entry cell itself collides.
    #[must_use]
    pub fn accessible_columns(&self, map: &CollisionMap) -> Vec<bool> {
        let width = map.width();
        let entry_row = map.height() - 1;
        let entry = self.timing.entry_column;
        let mut accessible = vec![false; width];
        if entry >= width || map.collides(entry_row, entry) {
            return accessible;
        }
        accessible[entry] = true;

        for direction in [-1, 1] {
            let mut prev = entry;
            let mut steps = 0;
            while let Some(col) = prev
                .checked_add_signed(direction)
                .filter(|&col| col < width)
            {
                steps += 1;
                let step_frame = self.step_frame(steps);
                let in_time = [col, prev].into_iter().all(|c| {
                    self.frames_until_lock(map, c)
                        .is_some_and(|frames| frames >= step_frame)
                });
                if !in_time {
                    break;
                }
                accessible[col] = true;
                prev = col;
            }
        }
        accessible
    }

    /// Every reachable final position, ordered by orientation, then row, then
    /// column.
    ///
    /// Empty when the piece collides at its entry position (the game is over).
    #[must_use]
    pub fn placements(&self, grid: &Grid, kind: PieceKind) -> Vec<Placement> {
        let (height, width) = (grid.height(), grid.width());
        if self.timing.entry_column >= width {
            log::warn!(
                "entry column {} is outside a {width}-wide grid",
                self.timing.entry_column
            );
            return vec![];
        }

        let maps = self.collision_maps(grid, kind);
        if maps[0].collides(height - 1, self.timing.entry_column) {
            log::debug!("{kind} collides at entry, no placements");
            return vec![];
        }
        let access: ArrayVec<Vec<bool>, MAX_ORIENTATIONS> =
            maps.iter().map(|map| self.accessible_columns(map)).collect();

        let num_orientations = maps.len();
        let mut placements = vec![];
        for (orientation, (map, accessible)) in maps.iter().zip(&access).enumerate() {
            log::trace!(
                "{kind}#{orientation}: landing={:?} accessible={:?}",
                (0..width).map(|c| map.landing_row(c)).collect::<Vec<_>>(),
                accessible
            );

            let reached_from = |o: usize, col: usize, row: usize| {
                access[o][col] && maps[o].landing_row(col).is_some_and(|l| row >= l)
            };
            let cw = (orientation + 1) % num_orientations;
            let ccw = (orientation + num_orientations - 1) % num_orientations;

            for row in 0..height {
                for col in (0..width).filter(|&col| accessible[col]) {
                    if !map.is_resting(row, col) {
                        continue;
                    }
                    let dropped = map.landing_row(col) == Some(row);
                    let slid = [col.checked_sub(1), Some(col + 1).filter(|&c| c < width)]
                        .into_iter()
                        .flatten()
                        .any(|neighbour| reached_from(orientation, neighbour, row));
                    let spun = reached_from(cw, col, row) || reached_from(ccw, col, row);
                    if dropped || slid || spun {
                        #[expect(clippy::cast_possible_truncation)]
                        let orientation = orientation as u8;
                        placements.push(Placement {
                            row,
                            col,
                            orientation,
                        });
                    }
                }
            }
        }
        placements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer(auto_repeat: usize, gravity: usize, entry_column: usize) -> ReachabilityAnalyzer {
        ReachabilityAnalyzer::new(Timing {
            auto_repeat,
            gravity,
            entry_column,
        })
    }

    fn grid(art: &str) -> Grid {
        Grid::from_ascii(art).unwrap()
    }

    #[test]
    fn test_collision_map_on_empty_grid() {
        let grid = Grid::default();
        // horizontal I spans col-2..=col+1
        let map = CollisionMap::new(&grid, PieceKind::I, 0, 19);
        for col in 0..10 {
            assert!(map.collides(20, col) == !(2..=8).contains(&col));
        }
        let landing: Vec<_> = (0..10).map(|c| map.landing_row(c)).collect();
        let mut expected = vec![Some(0); 10];
        for col in [0, 1, 9] {
            expected[col] = None;
        }
        assert_eq!(landing, expected);
        assert!(map.is_resting(0, 4));
        assert!(!map.is_resting(1, 4));

        // vertical I hangs one row below the pivot
        let map = CollisionMap::new(&grid, PieceKind::I, 1, 19);
        assert!(map.collides(0, 3));
        assert!((0..10).all(|c| map.landing_row(c) == Some(1)));
    }

    #[test]
    fn test_above_ceiling_is_not_a_collision() {
        let grid = Grid::new(4, 4).unwrap();
        let map = CollisionMap::new(&grid, PieceKind::I, 1, 3);
        // pivot on the ceiling row puts two cells above the grid
        assert!(!map.collides(3, 0));
        assert!(!map.collides(4, 0));
        assert_eq!(map.landing_row(0), Some(1));
    }

    #[test]
    fn test_landing_row_blocked_above_entry() {
        let grid = grid(
            r"
            ....
            #...
            #...
            #...
            ",
        );
        // O occupies pivot col and col-1; it lands on top of the stack only
        // at row 4, above the entry row 3.
        let map = CollisionMap::new(&grid, PieceKind::O, 0, 3);
        assert_eq!(map.landing_row(0), None);
        assert_eq!(map.landing_row(1), None);
        assert_eq!(map.landing_row(2), Some(1));
    }

    #[test]
    fn test_i_piece_instant_drop_reaches_every_column() {
        let placements = analyzer(0, 0, 5).placements(&Grid::default(), PieceKind::I);
        assert_eq!(placements.len(), 17);

        let horizontal: Vec<_> = placements
            .iter()
            .filter(|p| p.orientation == 0)
            .map(|p| (p.row, p.col))
            .collect();
        assert_eq!(horizontal, (2..=8).map(|c| (0, c)).collect::<Vec<_>>());

        let vertical: Vec<_> = placements
            .iter()
            .filter(|p| p.orientation == 1)
            .map(|p| (p.row, p.col))
            .collect();
        assert_eq!(vertical, (0..10).map(|c| (1, c)).collect::<Vec<_>>());
    }

    #[test]
    fn test_candidates_ordered_by_orientation_row_col() {
        let placements = analyzer(5, 1, 5).placements(&Grid::default(), PieceKind::T);
        let mut sorted = placements.clone();
        sorted.sort_by_key(|p| (p.orientation, p.row, p.col));
        assert_eq!(placements, sorted);
    }

    #[test]
    fn test_timing_limits_far_columns() {
        let grid = Grid::default();
        let maps = analyzer(5, 0, 5).collision_maps(&grid, PieceKind::I);
        let analyzer = analyzer(5, 0, 5);
        // vertical I lands on row 1: 19 frames to lock.
        // steps land on frames 1, 7, 13, 19, 25
        let accessible = analyzer.accessible_columns(&maps[1]);
        let reached: Vec<_> = (0..10).filter(|&c| accessible[c]).collect();
        assert_eq!(reached, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);

        let slow = ReachabilityAnalyzer::new(Timing {
            auto_repeat: 5,
            gravity: 1,
            entry_column: 5,
        });
        assert!(slow.accessible_columns(&maps[1]).iter().all(|a| *a));

        let fast = ReachabilityAnalyzer::new(Timing {
            auto_repeat: 9,
            gravity: 0,
            entry_column: 5,
        });
        // frames 1, 11, 21: two steps each way
        let accessible = fast.accessible_columns(&maps[1]);
        let reached: Vec<_> = (0..10).filter(|&c| accessible[c]).collect();
        assert_eq!(reached, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_extreme_timing_saturates() {
        let grid = Grid::default();
        let endless = analyzer(5, usize::MAX, 5).placements(&grid, PieceKind::T);
        let instant = analyzer(0, 0, 5).placements(&grid, PieceKind::T);
        assert_eq!(endless, instant);

        // the first step is immediate, the second never comes
        let frozen = analyzer(usize::MAX, 0, 5);
        let maps = frozen.collision_maps(&grid, PieceKind::T);
        let accessible = frozen.accessible_columns(&maps[0]);
        let reached: Vec<_> = (0..10).filter(|&c| accessible[c]).collect();
        assert_eq!(reached, vec![4, 5, 6]);
    }

    #[test]
    fn test_tall_column_blocks_the_scan() {
        let grid = grid(
            r"
            ..........
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ",
        );
        let analyzer = analyzer(0, 0, 5);
        let maps = analyzer.collision_maps(&grid, PieceKind::I);
        let accessible = analyzer.accessible_columns(&maps[1]);
        // the wall at col 3 reaches the entry row
        assert_eq!(maps[1].landing_row(3), None);
        assert!(!accessible[3]);
        assert!(!accessible[2] && !accessible[0]);
        assert!(accessible[4] && accessible[9]);
    }

    #[test]
    fn test_entry_collision_means_no_placements() {
        let mut grid = Grid::new(6, 10).unwrap();
        grid.fill(Coord::new(5, 5), Grid::BLOCK);
        assert!(
            analyzer(0, 0, 5)
                .placements(&grid, PieceKind::O)
                .is_empty()
        );
        assert!(
            analyzer(0, 0, 10)
                .placements(&Grid::default(), PieceKind::O)
                .is_empty()
        );
    }

    #[test]
    fn test_orientation_blocked_at_entry_contributes_nothing() {
        // a block just below the entry row stops the vertical I (which hangs
        // one row below its pivot) but not the horizontal one
        let mut grid = Grid::new(6, 10).unwrap();
        grid.fill(Coord::new(4, 5), Grid::BLOCK);
        let placements = analyzer(0, 0, 5).placements(&grid, PieceKind::I);
        assert!(!placements.is_empty());
        assert!(placements.iter().all(|p| p.orientation == 0));
    }

    #[test]
    fn test_slide_under_overhang() {
        let grid = grid(
            r"
            ......
            ......
            ......
            ...##.
            ......
            ......
            ",
        );
        // O covers rows row-1..=row and cols col-1..=col. Columns 3-5 land on
        // the ledge (row 4); the two-row gap beneath it can only be entered
        // sideways.
        let analyzer = analyzer(0, 0, 2);
        let maps = analyzer.collision_maps(&grid, PieceKind::O);
        assert_eq!(maps[0].landing_row(3), Some(4));
        assert!(maps[0].is_resting(1, 3));

        let cells: Vec<_> = analyzer
            .placements(&grid, PieceKind::O)
            .iter()
            .map(|p| (p.row, p.col))
            .collect();
        assert_eq!(cells, vec![(1, 1), (1, 2), (1, 3), (4, 3), (4, 4)]);
    }

    #[test]
    fn test_spin_under_ledges() {
        let grid = grid(
            r"
            ......
            ......
            ......
            .#..#.
            ......
            ......
            ",
        );
        let analyzer = analyzer(0, 0, 3);
        let maps = analyzer.collision_maps(&grid, PieceKind::T);
        assert_eq!(maps[0].landing_row(2), Some(3));
        assert_eq!(maps[0].landing_row(3), Some(3));
        assert_eq!(maps[0].landing_row(4), Some(4));
        assert_eq!(maps[1].landing_row(3), Some(1));
        assert!(maps[0].is_resting(1, 3));

        // neither a drop nor a slide: the upright T fits between the ledges
        // and turns flat at the bottom
        let spun = Placement {
            row: 1,
            col: 3,
            orientation: 0,
        };
        assert!(analyzer.placements(&grid, PieceKind::T).contains(&spun));
    }
}
