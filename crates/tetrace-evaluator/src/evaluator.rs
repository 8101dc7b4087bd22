//! Move generation and ranking in one place.
//!
//! [`MoveEvaluator`] runs the reachability search, materializes each
//! placement, scores it and keeps the ranked list until the next call. An
//! autonomous player takes the first entry; a move browser steps through the
//! whole list.
//!
//! ```
//! use tetrace_engine::{Board, Piece, PieceKind};
//! use tetrace_evaluator::{config::EvaluatorConfig, evaluator::MoveEvaluator};
//!
//! let mut evaluator = MoveEvaluator::new(EvaluatorConfig::default()).unwrap();
//! let board = Board::default();
//! let moves = evaluator.generate_moves(&board, &Piece::new(PieceKind::T));
//! assert!(!moves.is_empty());
//! assert!(moves.windows(2).all(|w| w[0].score.total() >= w[1].score.total()));
//! ```

use serde::Serialize;
use tetrace_engine::{Board, Grid, Piece};

use crate::{
    board_analysis::BoardAnalysis,
    config::{ConfigError, EvaluatorConfig, WellSelection},
    heuristic::{HeuristicEvaluator, PlacementEvaluator, Score},
    move_generator::{GeneratedMove, MoveGenerator},
    placement_analysis::PlacementAnalysis,
    reachability::Placement,
};

/// A candidate board with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMove {
    pub placement: Placement,
    pub piece: Piece,
    pub board: Board,
    pub cleared_rows: usize,
    pub score: Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EvaluatorState {
    /// No candidates held.
    Idle,
    /// Candidates scored and sorted. The list may be empty (no legal move).
    Generated,
}

#[derive(Debug)]
pub struct MoveEvaluator {
    config: EvaluatorConfig,
    generator: MoveGenerator,
    placement_evaluator: Box<dyn PlacementEvaluator>,
    tracked_well: Option<usize>,
    state: EvaluatorState,
    moves: Vec<RankedMove>,
}

impl MoveEvaluator {
    /// Creates an evaluator using the heuristic configured in `config`.
    pub fn new(config: EvaluatorConfig) -> Result<Self, ConfigError> {
        let heuristic = HeuristicEvaluator::new(config.heuristic.clone());
        Self::with_placement_evaluator(config, Box::new(heuristic))
    }

    /// Creates an evaluator that scores placements with `placement_evaluator`.
    pub fn with_placement_evaluator(
        config: EvaluatorConfig,
        placement_evaluator: Box<dyn PlacementEvaluator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            generator: MoveGenerator::new(config.timing),
            config,
            placement_evaluator,
            tracked_well: None,
            state: EvaluatorState::Idle,
            moves: vec![],
        })
    }

    #[must_use]
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> EvaluatorState {
        self.state
    }

    /// Gravity changes with the level during a game.
    pub fn set_gravity(&mut self, gravity: usize) {
        self.config.timing.gravity = gravity;
        self.generator.set_gravity(gravity);
    }

    fn select_well(&mut self, grid: &Grid) -> usize {
        let last_column = grid.width() - 1;
        match self.config.well {
            WellSelection::LastColumn => last_column,
            WellSelection::Fixed(column) => column.min(last_column),
            WellSelection::RightmostEmpty => {
                let well = BoardAnalysis::new(grid)
                    .rightmost_empty_column()
                    .or(self.tracked_well)
                    .unwrap_or(last_column);
                self.tracked_well = Some(well);
                well
            }
        }
    }

    /// Generates, scores and ranks every reachable placement of `piece`.
    ///
    /// The result is sorted by total score, best first; ties keep the
    /// generation order. An empty result means the piece cannot enter play.
    ///
    /// The board's own size is what counts: the configured `height` and
    /// `width` only size new boards, and a fixed well past the board's last
    /// column is moved onto it.
    pub fn generate_moves(&mut self, board: &Board, piece: &Piece) -> &[RankedMove] {
        let well = self.select_well(board.grid());
        let generated = self.generator.generate(board, piece);

        let mut moves: Vec<RankedMove> = generated
            .into_iter()
            .map(|generated| {
                let score = self
                    .placement_evaluator
                    .evaluate_placement(&PlacementAnalysis::new(&generated, well));
                let GeneratedMove {
                    placement,
                    piece,
                    board,
                    cleared_rows,
                } = generated;
                RankedMove {
                    placement,
                    piece,
                    board,
                    cleared_rows,
                    score,
                }
            })
            .collect();
        moves.sort_by(|a, b| b.score.total().total_cmp(&a.score.total()));

        log::debug!(
            "{}: {} candidates, well {well}, best {:?}",
            piece.kind(),
            moves.len(),
            moves.first().map(|mv| mv.score.total())
        );
        self.moves = moves;
        self.state = EvaluatorState::Generated;
        &self.moves
    }

    /// The ranked candidates of the last [`Self::generate_moves`] call.
    #[must_use]
    pub fn moves(&self) -> &[RankedMove] {
        &self.moves
    }

    #[must_use]
    pub fn best(&self) -> Option<&RankedMove> {
        self.moves.first()
    }

    /// Drops the candidates and returns to [`EvaluatorState::Idle`].
    pub fn clear(&mut self) {
        self.moves.clear();
        self.state = EvaluatorState::Idle;
    }
}
