//! Debounce table: at most one pending timer per path.
//!
//! The table maps each path with a pending trigger to its [`DebounceTimer`].
//! One lock guards the whole map and is held only for a lookup, insert or
//! delete; never while a timer waits or a command runs, so paths never
//! serialize behind each other.
//!
//! An entry is inserted by the event loop on the first relevant event for a
//! path and removed by that path's own timer task once its action has
//! finished, whatever the outcome. A later event then starts a fresh cycle.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use war_core::{FxHashMap, fx_hash_map};

use crate::events::WatchEvent;
use crate::runner::ActionHandler;
use crate::timer::DebounceTimer;

/// A path's pending trigger.
pub type PendingTimer = DebounceTimer<WatchEvent>;

/// Concurrent map from path to [`PendingTimer`].
pub struct DebounceTable {
    timers: Mutex<FxHashMap<Utf8PathBuf, PendingTimer>>,
    handler: Arc<dyn ActionHandler>,
}

impl std::fmt::Debug for DebounceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebounceTable")
            .field("pending", &self.len())
            .finish_non_exhaustive()
    }
}

impl DebounceTable {
    /// Creates an empty table whose timers run `handler` when they fire.
    #[must_use]
    pub fn new(handler: Arc<dyn ActionHandler>) -> Arc<Self> {
        Self::with_capacity(handler, 0)
    }

    /// Creates an empty table sized for `capacity` concurrently pending paths.
    #[must_use]
    pub fn with_capacity(handler: Arc<dyn ActionHandler>, capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            timers: Mutex::new(fx_hash_map(capacity)),
            handler,
        })
    }

    /// Returns the path's pending timer, creating an idle one if needed.
    ///
    /// A new timer is inserted before the lock is released and is not armed;
    /// the caller arms it with [`DebounceTimer::reset`]. When it fires it runs
    /// the handler and then removes its own entry.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn get_or_create(self: &Arc<Self>, path: &Utf8Path) -> PendingTimer {
        let mut timers = self.timers.lock();

        if let Some(timer) = timers.get(path) {
            return timer.clone();
        }

        let table = Arc::clone(self);
        let key = path.to_owned();
        let timer = DebounceTimer::spawn(move |event: WatchEvent| async move {
            table.handler.handle(event).await;
            table.remove(&key);
        });

        tracing::trace!(path = %path, "Created debounce timer");
        timers.insert(path.to_owned(), timer.clone());
        timer
    }

    /// Deletes the path's entry.
    ///
    /// Only a fired timer's own task calls this.
    pub fn remove(&self, path: &Utf8Path) {
        if self.timers.lock().remove(path).is_some() {
            tracing::trace!(path = %path, "Removed debounce timer");
        }
    }

    /// Returns the number of paths with a pending or running trigger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.lock().len()
    }

    /// Returns `true` if no path has a pending or running trigger.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.lock().is_empty()
    }

    /// Returns `true` if the path has an entry.
    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.timers.lock().contains_key(path)
    }

    /// Closes every timer that has not started firing and drops its entry.
    ///
    /// Triggers already running finish and remove themselves.
    pub fn close_all(&self) {
        let mut timers = self.timers.lock();
        timers.retain(|_, timer| !timer.close());
        tracing::debug!(running = timers.len(), "Closed pending debounce timers");
    }
}
