//! Per-path debounced file watching that runs a command chain.
//!
//! This crate is the engine behind `war`: it watches a fixed set of paths via
//! the `notify` crate and, once a path has gone quiet for the debounce window,
//! runs the configured [`CommandChain`](war_core::CommandChain), stopping at
//! the first failing command.
//!
//! # Overview
//!
//! - [`FsWatcher`] registers paths and feeds raw events and errors into two
//!   tokio channels
//! - [`EventLoop`] drains both channels and resets per-path timers on every
//!   create or write event
//! - [`DebounceTable`] holds at most one [`DebounceTimer`] per path
//! - [`ChainRunner`] runs the command chain when a timer fires
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  events / errors  ┌────────────┐  get_or_create  ┌────────────────┐
//! │  FsWatcher   │ ────────────────► │ EventLoop  │ ──────────────► │ DebounceTable  │
//! │  (notify)    │   mpsc channels   │ (one task) │     reset       │ path → timer   │
//! └──────────────┘                   └────────────┘                 └───────┬────────┘
//!                                                                           │ deadline
//!                                                                           ▼ elapsed
//!                                                              ┌────────────────────────┐
//!                                                              │ timer task:            │
//!                                                              │ ChainRunner, then      │
//!                                                              │ remove own entry       │
//!                                                              └────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use war_core::{CommandChain, Config};
//!
//! # async fn example() -> Result<(), war_watcher::WatchError> {
//! let config = Config::new(
//!     vec!["/tmp/w".into()],
//!     CommandChain::parse(["echo building", "make"])?,
//! );
//!
//! let shutdown = CancellationToken::new();
//! war_watcher::run(&config, shutdown).await?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod event_loop;
pub mod events;
pub mod runner;
pub mod source;
pub mod table;
pub mod timer;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use war_core::Config;

pub use error::WatchError;
pub use event_loop::EventLoop;
pub use events::{EventKind, WatchEvent};
pub use runner::{ActionHandler, ChainOutcome, ChainRunner, ChainSummary, StepReport, StepStatus};
pub use source::{FsWatcher, Streams};
pub use table::{DebounceTable, PendingTimer};
pub use timer::{DebounceTimer, TimerState};

/// Watches the configured paths and runs the command chain until shut down.
///
/// Returns `Ok(())` once `shutdown` is cancelled or the watcher's streams
/// close. Startup failures (invalid configuration, a path that cannot be
/// watched) return an error before anything is watched. Command chains that
/// are already running when this returns are not interrupted.
///
/// # Errors
///
/// Returns [`WatchError::Config`], [`WatchError::PathNotFound`],
/// [`WatchError::Register`] or [`WatchError::Notify`] on startup failure.
pub async fn run(config: &Config, shutdown: CancellationToken) -> Result<(), WatchError> {
    config.validate()?;

    let (mut source, streams) = FsWatcher::new()?;
    for path in &config.watch.paths {
        source.add(path)?;
    }

    let runner = ChainRunner::new(config.commands.clone());
    let event_loop = EventLoop::with_capacity(
        Arc::new(runner),
        config.watch.debounce(),
        config.watch.paths.len(),
    );

    debug!(
        paths = config.watch.paths.len(),
        commands = config.commands.len(),
        debounce_ms = config.watch.debounce_ms,
        "Starting event loop"
    );
    info!("watching; press ^C to exit");

    tokio::select! {
        () = event_loop.run(streams) => debug!("Watcher streams closed"),
        () = shutdown.cancelled() => debug!("Shutdown requested"),
    }

    drop(event_loop);
    source.close();
    Ok(())
}
