use blockfall_engine::{Catalog, PieceGenerator, PieceSeed, ShapeKind};
use clap::{Parser, Subcommand, ValueEnum};
use rand::Rng as _;

use crate::{
    command::{play::PlayArg, simulate::SimulateArg},
    logging::{self, LogArg},
};

mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[clap(flatten)]
    log: LogArg,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Apply a scripted command sequence and print the resulting board
    Simulate(#[clap(flatten)] SimulateArg),
}

/// Options shared by every mode that runs a game.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GameArg {
    /// Piece seed as 32 hexadecimal digits (random if omitted)
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Which shapes new pieces are drawn from
    #[clap(long, value_enum, default_value_t)]
    catalog: CatalogArg,
}

impl GameArg {
    pub(crate) fn generator(&self) -> PieceGenerator {
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        PieceGenerator::with_catalog(seed, self.catalog.catalog())
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum CatalogArg {
    /// All seven tetrominoes
    #[default]
    Standard,
    /// Straight line, square and T
    Minimal,
    /// Straight line only
    Line,
}

impl CatalogArg {
    fn catalog(self) -> Catalog {
        match self {
            CatalogArg::Standard => Catalog::standard(),
            CatalogArg::Minimal => Catalog::minimal(),
            CatalogArg::Line => Catalog::from_kinds([ShapeKind::I]).unwrap_or_default(),
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init(&args.log)?;
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
    }
    Ok(())
}
