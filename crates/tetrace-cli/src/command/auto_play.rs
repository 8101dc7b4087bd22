use std::path::PathBuf;

use anyhow::Context;
use rand::Rng;
use tetrace_engine::PieceSeed;
use tetrace_evaluator::session::AutoSession;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Piece sequence seed (32 hex digits); random when omitted
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Stop after this many pieces
    #[arg(long, default_value_t = 1000)]
    turns: usize,
    /// Level the session starts at (sets the initial gravity)
    #[arg(long, default_value_t = 18)]
    start_level: usize,
    /// Evaluator config file (JSON); defaults are used for missing fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path for the session summary (JSON)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        seed,
        turns,
        start_level,
        config,
        output,
    } = arg;

    let config = util::read_config_file(config.as_deref())?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let session =
        AutoSession::new(config, seed, *start_level).context("Invalid evaluator config")?;

    eprintln!("Playing up to {turns} pieces with seed {seed}...");
    let summary = session.run(*turns);
    eprintln!(
        "{} pieces, {} lines, score {}{}",
        summary.pieces,
        summary.lines,
        summary.score,
        if summary.topped_out { ", topped out" } else { "" }
    );

    Output::save_json(&summary, output.clone())
}
