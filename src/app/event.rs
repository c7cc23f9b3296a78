//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a blocking reader on
//! tokio's blocking pool that forwards them over a channel, so the main loop
//! can `select!` between input and auto-sort steps.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
}

/// Spawn the reader and return the receiving end.  The reader exits once the
/// receiver is dropped.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        let app_event = match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                // Windows also reports key release and repeat events.
                Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => AppEvent::Key(k),
                Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(%err, "terminal event read failed");
                    continue;
                }
            },
            Ok(false) => AppEvent::Tick,
            Err(err) => {
                tracing::warn!(%err, "terminal event poll failed");
                break;
            }
        };
        if tx.send(app_event).is_err() {
            break; // receiver dropped
        }
    });

    rx
}
