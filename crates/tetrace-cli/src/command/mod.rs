use clap::{Parser, Subcommand};

use self::{auto_play::AutoPlayArg, browse::BrowseArg};

mod auto_play;
mod browse;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play unattended, always locking the best-ranked placement
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Rank every reachable placement of one piece on a saved board
    Browse(#[clap(flatten)] BrowseArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::Browse(arg) => browse::run(&arg)?,
    }
    Ok(())
}
