use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

use super::event::HostEvent;

/// Produces gravity ticks, redraw requests and terminal events in order.
///
/// A redraw is requested once after startup and after every gravity tick or
/// terminal event, so the host re-reads the engine state after each call.
#[derive(Debug)]
pub(super) struct EventLoop {
    gravity_interval: Option<Duration>,
    last_gravity: Instant,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    /// Creates an `EventLoop` without gravity.
    pub(super) fn new() -> Self {
        Self {
            gravity_interval: None,
            last_gravity: Instant::now(),
            dirty: true,
        }
    }

    /// Sets the gravity interval and restarts the gravity timer.
    ///
    /// Pass `None` to stop gravity ticks.
    pub(super) fn set_gravity_interval(&mut self, interval: Option<Duration>) {
        self.gravity_interval = interval;
        self.last_gravity = Instant::now();
    }

    /// Returns the next event, blocking until one is due.
    pub(super) fn next(&mut self) -> io::Result<HostEvent> {
        loop {
            let now = Instant::now();
            if let Some(event) = self.due_event(now) {
                return Ok(event);
            }

            if let Some(timeout) = self.timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    fn due_event(&mut self, now: Instant) -> Option<HostEvent> {
        if let Some(interval) = self.gravity_interval
            && now.duration_since(self.last_gravity) >= interval
        {
            self.last_gravity = now;
            self.dirty = true;
            return Some(HostEvent::Gravity);
        }
        if self.dirty {
            self.dirty = false;
            return Some(HostEvent::Render);
        }
        None
    }

    fn timeout(&self, now: Instant) -> Option<Duration> {
        self.gravity_interval
            .map(|interval| (self.last_gravity + interval).saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_render() {
        let mut events = EventLoop::new();
        let now = Instant::now();
        assert!(events.due_event(now).is_some_and(|e| e.is_render()));
        assert!(events.due_event(now).is_none());
        assert_eq!(events.timeout(now), None);
    }

    #[test]
    fn test_gravity_then_render() {
        let mut events = EventLoop::new();
        events.set_gravity_interval(Some(Duration::from_millis(100)));
        let start = events.last_gravity;

        assert!(events.due_event(start).is_some_and(|e| e.is_render()));
        assert!(events.due_event(start + Duration::from_millis(50)).is_none());
        assert_eq!(
            events.timeout(start + Duration::from_millis(50)),
            Some(Duration::from_millis(50))
        );

        let later = start + Duration::from_millis(100);
        assert!(events.due_event(later).is_some_and(|e| e.is_gravity()));
        assert!(events.due_event(later).is_some_and(|e| e.is_render()));
        assert!(events.due_event(later).is_none());
    }

    #[test]
    fn test_disable_gravity() {
        let mut events = EventLoop::new();
        events.set_gravity_interval(Some(Duration::ZERO));
        events.set_gravity_interval(None);
        let now = Instant::now();
        assert!(events.due_event(now).is_some_and(|e| e.is_render()));
        assert!(events.due_event(now + Duration::from_secs(10)).is_none());
    }
}
