//! Unattended play: always lock the best-ranked candidate.
//!
//! ```
//! use tetrace_engine::PieceSeed;
//! use tetrace_evaluator::{config::EvaluatorConfig, session::AutoSession};
//!
//! let seed = PieceSeed::from_bytes([7; 16]);
//! let summary = AutoSession::new(EvaluatorConfig::default(), seed, 18)
//!     .unwrap()
//!     .run(50);
//! assert!(summary.pieces <= 50);
//! ```

use serde::Serialize;
use tetrace_engine::{Board, LINE_TYPES, LevelProgress, Piece, PieceGenerator, PieceSeed};

use crate::{
    config::{ConfigError, EvaluatorConfig},
    evaluator::{MoveEvaluator, RankedMove},
};

/// Final statistics of an [`AutoSession`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub seed: PieceSeed,
    pub pieces: usize,
    pub lines: usize,
    pub line_type_count: [usize; LINE_TYPES],
    pub score: usize,
    pub start_level: usize,
    pub level: usize,
    /// Whether the session ended because no piece could enter play.
    pub topped_out: bool,
    pub board: Board,
}

#[derive(Debug)]
pub struct AutoSession {
    evaluator: MoveEvaluator,
    board: Board,
    pieces: PieceGenerator,
    progress: LevelProgress,
    seed: PieceSeed,
    placed: usize,
}

impl AutoSession {
    pub fn new(
        config: EvaluatorConfig,
        seed: PieceSeed,
        start_level: usize,
    ) -> Result<Self, ConfigError> {
        let board = Board::new(config.height, config.width).map_err(ConfigError::GridSize)?;
        let mut evaluator = MoveEvaluator::new(config)?;
        let progress = LevelProgress::new(start_level);
        evaluator.set_gravity(progress.gravity());
        Ok(Self {
            evaluator,
            board,
            pieces: PieceGenerator::with_seed(seed),
            progress,
            seed,
            placed: 0,
        })
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn progress(&self) -> &LevelProgress {
        &self.progress
    }

    /// Spawns the next piece and locks the best candidate.
    ///
    /// Returns `None` when the piece cannot enter play.
    pub fn step(&mut self) -> Option<RankedMove> {
        let kind = self.pieces.pop_next();
        let config = self.evaluator.config();
        #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let (row, col) = (config.entry_row() as i32, config.timing.entry_column as i32);
        let piece = Piece::at(kind, row, col, 0);

        let best = self.evaluator.generate_moves(&self.board, &piece).first().cloned()?;
        self.board = best.board.clone();
        self.placed += 1;
        if self.progress.record_clear(best.cleared_rows) {
            log::debug!(
                "level {} reached, gravity {}",
                self.progress.level(),
                self.progress.gravity()
            );
            self.evaluator.set_gravity(self.progress.gravity());
        }
        Some(best)
    }

    /// Plays until the stack tops out or `turn_limit` pieces are locked.
    pub fn run(mut self, turn_limit: usize) -> SessionSummary {
        log::info!(
            "session {} starting at level {}",
            self.seed,
            self.progress.start_level()
        );
        let mut topped_out = false;
        while self.placed < turn_limit {
            if self.step().is_none() {
                topped_out = true;
                break;
            }
        }
        log::info!(
            "session {} ended after {} pieces: {} lines, score {}{}",
            self.seed,
            self.placed,
            self.progress.lines(),
            self.progress.score(),
            if topped_out { " (topped out)" } else { "" }
        );
        SessionSummary {
            seed: self.seed,
            pieces: self.placed,
            lines: self.progress.lines(),
            line_type_count: *self.board.line_type_count(),
            score: self.progress.score(),
            start_level: self.progress.start_level(),
            level: self.progress.level(),
            topped_out,
            board: self.board,
        }
    }
}
