use std::time::Duration;

use blockfall_engine::Engine;

use crate::{
    command::{GameArg, play::app::PlayApp},
    tui::Runtime,
};

mod app;
mod screen;

const DEFAULT_GRAVITY_MS: u64 = 500;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    game: GameArg,
    /// Milliseconds between gravity ticks
    #[clap(
        long,
        default_value_t = DEFAULT_GRAVITY_MS,
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    gravity_ms: u64,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            game: GameArg::default(),
            gravity_ms: DEFAULT_GRAVITY_MS,
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg { game, gravity_ms } = arg;

    let engine = Engine::with_generator(game.generator());
    log::info!(
        "starting game: seed={}, gravity={gravity_ms}ms",
        engine.generator().seed()
    );

    let mut app = PlayApp::new(engine, Duration::from_millis(*gravity_ms));
    Runtime::new().run(&mut app)?;
    Ok(())
}
