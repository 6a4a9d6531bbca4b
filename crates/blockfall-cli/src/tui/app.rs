use crossterm::event::Event;
use ratatui::Frame;

use super::Runtime;

/// Trait for applications driven by [`Runtime::run`].
pub(crate) trait App {
    /// Called once before the loop starts. Use this to set the gravity interval.
    fn init(&mut self, runtime: &mut Runtime);

    /// Returns whether the loop should stop.
    fn should_exit(&self) -> bool;

    /// Handles a terminal event (key input, resize, ...).
    fn handle_event(&mut self, runtime: &mut Runtime, event: &Event);

    /// Draws the current state.
    fn draw(&self, frame: &mut Frame);

    /// Called on every gravity tick.
    fn on_gravity(&mut self, runtime: &mut Runtime);
}
