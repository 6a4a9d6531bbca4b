use std::time::Duration;

use blockfall_engine::Engine;
use crossterm::event::Event;
use ratatui::Frame;

use crate::{
    command::play::screen::PlayScreen,
    tui::{App, Runtime},
};

#[derive(Debug)]
pub(crate) struct PlayApp {
    screen: PlayScreen,
    gravity: Duration,
    gravity_running: bool,
}

impl PlayApp {
    pub(crate) fn new(engine: Engine, gravity: Duration) -> Self {
        Self {
            screen: PlayScreen::new(engine),
            gravity,
            gravity_running: false,
        }
    }

    /// Runs gravity only while the piece can fall, restarting the timer on resume.
    fn sync_gravity(&mut self, runtime: &mut Runtime) {
        let running = self.screen.is_running();
        if running != self.gravity_running {
            runtime.set_gravity_interval(running.then_some(self.gravity));
            self.gravity_running = running;
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        self.sync_gravity(runtime);
    }

    fn should_exit(&self) -> bool {
        self.screen.is_exiting()
    }

    fn handle_event(&mut self, runtime: &mut Runtime, event: &Event) {
        self.screen.handle_event(event);
        self.sync_gravity(runtime);
    }

    fn draw(&self, frame: &mut Frame) {
        self.screen.draw(frame);
    }

    fn on_gravity(&mut self, runtime: &mut Runtime) {
        self.screen.on_gravity();
        self.sync_gravity(runtime);
    }
}
