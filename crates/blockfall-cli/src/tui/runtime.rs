use std::{io, time::Duration};

use super::{App, event::HostEvent, event_loop::EventLoop};

/// Terminal host runtime.
///
/// Owns the event loop and drives an [`App`] until it asks to exit.
#[derive(Default, Debug)]
pub(crate) struct Runtime {
    events: EventLoop,
}

impl Runtime {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets how often [`App::on_gravity`] is called and restarts the timer.
    pub(crate) fn set_gravity_interval(&mut self, interval: Option<Duration>) {
        self.events.set_gravity_interval(interval);
    }

    /// Runs the application.
    ///
    /// 1. Calls `app.init()`
    /// 2. Runs the event loop until `app.should_exit()` returns true
    ///    - `HostEvent::Gravity`: calls `app.on_gravity()`
    ///    - `HostEvent::Render`: calls `app.draw()`
    ///    - `HostEvent::Terminal`: calls `app.handle_event()`
    pub(crate) fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    HostEvent::Gravity => app.on_gravity(&mut self),
                    HostEvent::Render => {
                        terminal.draw(|f| app.draw(f))?;
                    }
                    HostEvent::Terminal(event) => app.handle_event(&mut self, &event),
                }
            }
            Ok(())
        })
    }
}
