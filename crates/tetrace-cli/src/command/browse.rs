use std::{io::Write as _, path::PathBuf};

use anyhow::Context;
use serde::Serialize;
use tetrace_engine::{Board, Piece, PieceKind};
use tetrace_evaluator::{
    evaluator::{MoveEvaluator, RankedMove},
    heuristic::Score,
};

use crate::util::{self, Output};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BrowseArg {
    /// Board file: one line per row, top row first, `.` empty and `#` filled
    board: PathBuf,
    /// Piece to place (one of L, J, S, Z, I, T, O)
    #[arg(long)]
    piece: PieceKind,
    /// Number of candidates to show, best first
    #[arg(long, default_value_t = 10)]
    top: usize,
    /// Gravity (frames between drops); overrides the config file
    #[arg(long)]
    gravity: Option<usize>,
    /// Evaluator config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BrowseReport<'a> {
    piece: PieceKind,
    candidates: usize,
    moves: &'a [RankedMove],
}

pub(crate) fn run(arg: &BrowseArg) -> anyhow::Result<()> {
    let BrowseArg {
        board,
        piece,
        top,
        gravity,
        config,
        format,
        output,
    } = arg;

    let grid = util::read_board_file(board)?;
    let mut config = util::read_config_file(config.as_deref())?;
    config.height = grid.height();
    config.width = grid.width();
    if let Some(gravity) = gravity {
        config.timing.gravity = *gravity;
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let (row, col) = (config.entry_row() as i32, config.timing.entry_column as i32);
    let mut evaluator = MoveEvaluator::new(config).context("Invalid evaluator config")?;
    let piece = Piece::at(*piece, row, col, 0);
    let board = Board::from_grid(grid);
    let moves = evaluator.generate_moves(&board, &piece);
    let shown = &moves[..moves.len().min(*top)];

    let mut output = Output::from_output_path(output.clone())?;
    match format {
        Format::Json => output.write_json(BrowseReport {
            piece: piece.kind(),
            candidates: moves.len(),
            moves: shown,
        }),
        Format::Text => {
            write_text(&mut output, &piece, moves.len(), shown)
                .with_context(|| format!("Failed to write to {}", output.display_path()))?;
            output.finish()
        }
    }
}

fn write_text(
    output: &mut Output,
    piece: &Piece,
    candidates: usize,
    moves: &[RankedMove],
) -> std::io::Result<()> {
    writeln!(output, "{}: {candidates} candidates", piece.kind())?;
    if candidates == 0 {
        writeln!(output, "the piece cannot enter play")?;
    }
    for (rank, mv) in moves.iter().enumerate() {
        let placement = mv.placement;
        writeln!(output)?;
        writeln!(
            output,
            "#{} row {} col {} orientation {}: {:.2}",
            rank + 1,
            placement.row,
            placement.col,
            placement.orientation,
            mv.score.total()
        )?;
        if mv.cleared_rows > 0 {
            writeln!(output, "  cleared {} rows", mv.cleared_rows)?;
        }
        match &mv.score {
            Score::Position(s) => writeln!(
                output,
                "  position: holes {:.2} roughness {:.2} well {:.2} min-height {:.2} \
                 avg-height {:.2} valleys {:.2} tetris {:.2}",
                s.holes,
                s.roughness,
                s.well_clear,
                s.min_height,
                s.average_height,
                s.valleys,
                s.tetris
            )?,
            Score::Burn(s) => writeln!(
                output,
                "  burn: hole-row {:.2} depth {:.2} filled {:.2} roughness {:.2} \
                 max-height {:.2} valleys {:.2} offset -{:.2}",
                s.hole_row,
                s.hole_depth,
                s.hole_row_filled,
                s.roughness,
                s.max_height,
                s.valleys,
                s.offset
            )?,
        }
        for line in mv.board.grid().to_string().lines() {
            writeln!(output, "  {line}")?;
        }
    }
    Ok(())
}
