//! Event bus for critique.
//!
//! Terminal input, timer ticks, and results of background network tasks are all
//! normalised into [`AppEvent`] and sent over one tokio unbounded MPSC channel.
//! The main loop is the only receiver, so all state mutation happens there.

use critique_core::{ApiError, ModelSelector, ReviewPayload};
use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;
use uuid::Uuid;

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    /// A key press (`KeyEventKind::Press` only).
    Key(KeyEvent),
    /// Bracketed paste into the terminal.
    Paste(String),
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    /// Logic tick (100 ms); drives the loading spinner.
    Tick,
    /// Render tick (≈30 FPS).
    Render,
    /// The model directory request finished.
    ModelsLoaded(ModelSelector),
    /// The saved response language was read from the store.
    PreferenceLoaded(Option<String>),
    /// Startup connectivity check finished.
    StartupPing(bool),
    /// Pre-submit connectivity check for the review identified by the token.
    PreflightPing { token: Uuid, reachable: bool },
    /// A review request finished.
    ReviewFinished {
        token: Uuid,
        outcome: Box<Result<ReviewPayload, ApiError>>,
    },
    Quit,
}

/// Sender and receiver of the unified event channel.
pub struct EventHandler {
    /// Clone this for each background task.
    pub tx: mpsc::UnboundedSender<AppEvent>,
    /// Owned by the main loop.
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the task that turns terminal input and timers into [`AppEvent`]s.
///
/// Runs until the receiver is dropped. `reader.next().fuse()` keeps `select!`
/// from polling a finished stream; release/repeat key events are filtered out
/// because Windows reports both press and release for every keystroke.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(100));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            let sent = tokio::select! {
                _ = tick_tick => tx.send(AppEvent::Tick),
                _ = render_tick => tx.send(AppEvent::Render),
                maybe_event = crossterm_event => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        tx.send(AppEvent::Key(key))
                    }
                    Some(Ok(Event::Paste(text))) => tx.send(AppEvent::Paste(text)),
                    Some(Ok(Event::Resize(w, h))) => tx.send(AppEvent::Resize(w, h)),
                    Some(Err(e)) => {
                        tracing::warn!(%e, "terminal input error");
                        Ok(())
                    }
                    None => tx.send(AppEvent::Quit),
                    _ => Ok(()),
                },
            };
            if sent.is_err() {
                break;
            }
        }
    });
}
