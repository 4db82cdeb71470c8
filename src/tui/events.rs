use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;

/// Application events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,
}

/// Event handler for managing input events
pub struct EventHandler {
    /// How long to wait for terminal input before emitting a tick
    tick_interval: Duration,
}

impl EventHandler {
    pub fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }

    /// Get the next event
    pub async fn next(&mut self) -> Result<Event> {
        let tick_interval = self.tick_interval;
        let polled = tokio::task::spawn_blocking(move || -> std::io::Result<_> {
            if crossterm::event::poll(tick_interval)? {
                Ok(Some(crossterm::event::read()?))
            } else {
                Ok(None)
            }
        })
        .await??;

        Ok(polled
            .and_then(Self::convert_crossterm_event)
            .unwrap_or(Event::Tick))
    }

    /// Convert crossterm events to application events
    fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
        match event {
            // Windows reports both press and release
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
            CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
            _ => None,
        }
    }
}
