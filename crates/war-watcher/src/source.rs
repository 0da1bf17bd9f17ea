//! Notification source: the bridge from `notify` to tokio channels.
//!
//! [`FsWatcher`] owns the OS watcher. Its callback runs on the watcher's own
//! thread and forwards every event and error into two bounded tokio channels,
//! which the event loop drains.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    notify thread                                │
//! │  ┌──────────────────┐    ┌──────────────────────────────────┐   │
//! │  │ RecommendedWatcher│ -> │ Callback (convert to WatchEvent)│   │
//! │  └──────────────────┘    └────────────────┬─────────────────┘   │
//! └───────────────────────────────────────────│─────────────────────┘
//!                                             │ blocking_send
//!                                             ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Async Runtime (tokio)                        │
//! │  ┌──────────────────┐    ┌──────────────────┐                   │
//! │  │ Streams::events  │    │ Streams::errors  │ -> EventLoop      │
//! │  └──────────────────┘    └──────────────────┘                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dropping or [closing](FsWatcher::close) the watcher drops the callback and
//! with it both senders, so the event loop sees both streams end.

use camino::{Utf8Path, Utf8PathBuf};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::WatchError;
use crate::events::{EventKind, WatchEvent};

/// Default channel capacity for events and errors.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// The two streams an [`FsWatcher`] feeds.
#[derive(Debug)]
pub struct Streams {
    /// Filesystem change events, in arrival order.
    pub events: mpsc::Receiver<WatchEvent>,

    /// Watcher-internal errors.
    pub errors: mpsc::Receiver<WatchError>,
}

/// Owns the OS file watcher and the set of registered paths.
pub struct FsWatcher {
    watcher: RecommendedWatcher,
    paths: Vec<Utf8PathBuf>,
}

impl std::fmt::Debug for FsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsWatcher")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

impl FsWatcher {
    /// Creates the OS watcher and the channels it feeds.
    ///
    /// No path is watched until [`add`](Self::add) is called.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Notify`] if the platform watcher cannot be created.
    pub fn new() -> Result<(Self, Streams), WatchError> {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a watcher whose channels hold up to `capacity` pending items.
    ///
    /// When the event channel is full the notify thread blocks until the
    /// event loop catches up.
    pub fn with_capacity(capacity: usize) -> Result<(Self, Streams), WatchError> {
        let (event_tx, events) = mpsc::channel(capacity);
        let (error_tx, errors) = mpsc::channel(capacity);

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => forward_event(&event_tx, &error_tx, event),
                Err(error) => {
                    // Receiver gone means the loop has stopped; nothing to report to.
                    let _ = error_tx.blocking_send(WatchError::Notify(error));
                }
            }
        })?;

        let source = Self {
            watcher,
            paths: Vec::new(),
        };

        Ok((source, Streams { events, errors }))
    }

    /// Registers a path for watching.
    ///
    /// Directories are watched non-recursively: changes to their direct
    /// children are reported, each under the child's own path.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if the path does not exist, or
    /// [`WatchError::Register`] if the OS refuses to watch it.
    pub fn add(&mut self, path: &Utf8Path) -> Result<(), WatchError> {
        if !path.exists() {
            return Err(WatchError::path_not_found(path));
        }

        self.watcher
            .watch(path.as_std_path(), RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Register {
                path: path.to_owned(),
                source,
            })?;

        tracing::debug!(path = %path, "Registered watch");
        self.paths.push(path.to_owned());
        Ok(())
    }

    /// Returns the registered paths in registration order.
    #[must_use]
    pub fn paths(&self) -> &[Utf8PathBuf] {
        &self.paths
    }

    /// Releases the OS watcher.
    ///
    /// Both streams end once any in-flight callback has returned.
    pub fn close(mut self) {
        for path in &self.paths {
            if let Err(error) = self.watcher.unwatch(path.as_std_path()) {
                tracing::debug!(path = %path, error = %error, "Failed to unwatch");
            }
        }
        self.paths.clear();
        tracing::debug!("File watcher closed");
    }
}

/// Converts one notify event and sends one [`WatchEvent`] per path.
///
/// A path that is not valid UTF-8 is reported on the error stream instead.
fn forward_event(
    events: &mpsc::Sender<WatchEvent>,
    errors: &mpsc::Sender<WatchError>,
    event: notify::Event,
) {
    let kind = EventKind::from(&event.kind);

    for path in event.paths {
        let path = match Utf8PathBuf::try_from(path) {
            Ok(p) => p,
            Err(e) => {
                let _ = errors.blocking_send(WatchError::NonUtf8Path(e.into_path_buf()));
                continue;
            }
        };

        tracing::trace!(path = %path, kind = %kind, "Raw file event");

        if events.blocking_send(WatchEvent::new(path, kind)).is_err() {
            tracing::debug!("Event channel closed, dropping file event");
            break;
        }
    }
}
