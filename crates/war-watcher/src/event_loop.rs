//! Event loop: the single consumer of the notification source.
//!
//! [`EventLoop::run`] drains the event and error streams until either one
//! closes. Every create or write event resets its path's debounce timer to
//! `now + window`, so a burst of events on one path collapses into a single
//! trigger `window` after the last event. Other event kinds are dropped and
//! watcher errors are logged without stopping the loop.
//!
//! The loop never waits on anything but its two streams: timers fire and
//! commands run on each timer's own task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::error::WatchError;
use crate::events::WatchEvent;
use crate::runner::ActionHandler;
use crate::source::Streams;
use crate::table::DebounceTable;

/// Routes relevant events into the [`DebounceTable`].
///
/// Dropping the loop closes every timer that has not started firing.
#[derive(Debug)]
pub struct EventLoop {
    table: Arc<DebounceTable>,
    window: Duration,
}

impl EventLoop {
    /// Creates a loop whose triggers run `handler` after `window` of quiet.
    #[must_use]
    pub fn new(handler: Arc<dyn ActionHandler>, window: Duration) -> Self {
        Self {
            table: DebounceTable::new(handler),
            window,
        }
    }

    /// Creates a loop with a table pre-sized for `paths` watched paths.
    #[must_use]
    pub fn with_capacity(handler: Arc<dyn ActionHandler>, window: Duration, paths: usize) -> Self {
        Self {
            table: DebounceTable::with_capacity(handler, paths),
            window,
        }
    }

    /// Returns the debounce window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Returns the debounce table.
    #[must_use]
    pub fn table(&self) -> &Arc<DebounceTable> {
        &self.table
    }

    /// Drains both streams until one of them closes.
    pub async fn run(&self, streams: Streams) {
        let Streams {
            mut events,
            mut errors,
        } = streams;
        self.drain(&mut events, &mut errors).await;
    }

    async fn drain(
        &self,
        events: &mut mpsc::Receiver<WatchEvent>,
        errors: &mut mpsc::Receiver<WatchError>,
    ) {
        loop {
            tokio::select! {
                error = errors.recv() => match error {
                    Some(error) => warn!("ERROR: {error}"),
                    None => {
                        debug!("Error stream closed, stopping event loop");
                        break;
                    }
                },
                event = events.recv() => match event {
                    Some(event) => {
                        self.dispatch(event);
                    }
                    None => {
                        debug!("Event stream closed, stopping event loop");
                        break;
                    }
                },
            }
        }
    }

    /// Applies one event to the table.
    ///
    /// Returns `true` if the event armed or extended a timer. Irrelevant
    /// kinds, and events that arrive while the path's chain is already
    /// running, return `false`.
    pub fn dispatch(&self, event: WatchEvent) -> bool {
        if !event.is_relevant() {
            trace!(path = %event.path, kind = %event.kind, "Ignoring event");
            return false;
        }

        let timer = self.table.get_or_create(&event.path);
        let deadline = Instant::now() + self.window;

        let path = event.path.clone();
        let armed = timer.reset(event, deadline);
        if armed {
            trace!(path = %path, "Debounce timer reset");
        } else {
            debug!(path = %path, "Command chain already running, event dropped");
        }
        armed
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.table.close_all();
    }
}
