use serde::{Deserialize, Serialize};

/// Points for single, double, triple and four-row clears at level 0.
///
/// The award scales linearly with the level: `LINE_SCORE[n - 1] * (level + 1)`.
pub const LINE_SCORE: [usize; 4] = [40, 100, 300, 1200];

/// Idle frames between two gravity drops at `level` (NES speed table).
///
/// A value of `g` means the piece falls one row every `g + 1` frames, so level
/// 29 and above (gravity 0) drop a row on every frame.
///
/// # Examples
///
/// ```
/// use tetrace_engine::gravity_for_level;
///
/// assert_eq!(gravity_for_level(0), 47);
/// assert_eq!(gravity_for_level(9), 5);
/// assert_eq!(gravity_for_level(18), 2);
/// assert_eq!(gravity_for_level(19), 1);
/// assert_eq!(gravity_for_level(29), 0);
/// ```
#[must_use]
pub const fn gravity_for_level(level: usize) -> usize {
    match level {
        0..=8 => 47 - 5 * level,
        9 => 5,
        10..=18 => 4 - (level - 10) / 3,
        19..=28 => 1,
        _ => 0,
    }
}

/// Lines needed to leave the starting level.
///
/// Later levels each take ten more lines.
#[must_use]
pub const fn first_level_threshold(start_level: usize) -> usize {
    match start_level {
        0..=9 => 10 * (start_level + 1),
        10..=15 => 100,
        _ => 10 * (start_level - 5),
    }
}

/// Points awarded for clearing `rows` rows at `level`.
#[must_use]
pub const fn line_score(rows: usize, level: usize) -> usize {
    match rows {
        0 => 0,
        1..=4 => LINE_SCORE[rows - 1] * (level + 1),
        _ => LINE_SCORE[LINE_SCORE.len() - 1] * (level + 1),
    }
}

/// Level, line and score bookkeeping for a session.
///
/// Scores are awarded at the level in effect when the rows are cleared; the
/// level is raised afterwards.
///
/// # Example
///
/// ```
/// use tetrace_engine::LevelProgress;
///
/// let mut progress = LevelProgress::new(0);
/// for _ in 0..9 {
///     progress.record_clear(1);
/// }
/// assert_eq!(progress.level(), 0);
/// progress.record_clear(1);
/// assert_eq!(progress.level(), 1);
/// assert_eq!(progress.gravity(), 42);
/// assert_eq!(progress.score(), 400);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    start_level: usize,
    level: usize,
    lines: usize,
    score: usize,
}

impl LevelProgress {
    #[must_use]
    pub const fn new(start_level: usize) -> Self {
        Self {
            start_level,
            level: start_level,
            lines: 0,
            score: 0,
        }
    }

    #[must_use]
    pub const fn start_level(&self) -> usize {
        self.start_level
    }

    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    #[must_use]
    pub const fn lines(&self) -> usize {
        self.lines
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Gravity for the current level.
    #[must_use]
    pub const fn gravity(&self) -> usize {
        gravity_for_level(self.level)
    }

    /// Records a lock that cleared `rows` rows. Returns `true` if the level
    /// changed.
    pub fn record_clear(&mut self, rows: usize) -> bool {
        if rows == 0 {
            return false;
        }
        self.score += line_score(rows, self.level);
        self.lines += rows;

        let threshold = first_level_threshold(self.start_level);
        if self.lines < threshold {
            return false;
        }
        let level = self.start_level + (self.lines - threshold) / 10 + 1;
        let changed = level != self.level;
        self.level = level;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_table() {
        let expected = [
            47, 42, 37, 32, 27, 22, 17, 12, 7, 5, // 0-9
            4, 4, 4, 3, 3, 3, 2, 2, 2, // 10-18
            1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 19-28
            0, 0,
        ];
        for (level, gravity) in expected.into_iter().enumerate() {
            assert_eq!(gravity_for_level(level), gravity, "level {level}");
        }
        assert_eq!(gravity_for_level(255), 0);
    }

    #[test]
    fn test_first_level_threshold() {
        assert_eq!(first_level_threshold(0), 10);
        assert_eq!(first_level_threshold(9), 100);
        assert_eq!(first_level_threshold(10), 100);
        assert_eq!(first_level_threshold(15), 100);
        assert_eq!(first_level_threshold(16), 110);
        assert_eq!(first_level_threshold(18), 130);
        assert_eq!(first_level_threshold(19), 140);
    }

    #[test]
    fn test_line_score_scales_with_level() {
        assert_eq!(line_score(0, 5), 0);
        assert_eq!(line_score(1, 0), 40);
        assert_eq!(line_score(2, 1), 200);
        assert_eq!(line_score(3, 9), 3000);
        assert_eq!(line_score(4, 18), 22_800);
    }

    #[test]
    fn test_score_uses_level_before_advance() {
        let mut progress = LevelProgress::new(0);
        progress.record_clear(3);
        progress.record_clear(3);
        assert_eq!(progress.score(), 600);
        assert_eq!(progress.level(), 0);
        // Crosses the threshold: scored at level 0, then promoted.
        assert!(progress.record_clear(4));
        assert_eq!(progress.score(), 600 + 1200);
        assert_eq!(progress.level(), 1);
        assert_eq!(progress.lines(), 10);
    }

    #[test]
    fn test_level_advances_every_ten_lines_after_threshold() {
        let mut progress = LevelProgress::new(18);
        for _ in 0..32 {
            progress.record_clear(4);
        }
        // 128 lines, threshold 130
        assert_eq!(progress.level(), 18);
        progress.record_clear(2);
        assert_eq!(progress.level(), 19);
        assert_eq!(progress.gravity(), 1);
        for _ in 0..5 {
            progress.record_clear(2);
        }
        assert_eq!(progress.lines(), 140);
        assert_eq!(progress.level(), 20);
        assert!(!progress.record_clear(0));
    }
}
