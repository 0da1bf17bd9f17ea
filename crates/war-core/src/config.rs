//! Configuration structures for the `war` file watcher.
//!
//! - [`WatchConfig`] - which paths to watch and how long a path must stay quiet
//! - [`Config`] - root configuration combining the watch settings and the
//!   [`CommandChain`]
//!
//! A [`Config`] is assembled once by the CLI and handed to the watcher by
//! reference; nothing mutates it afterwards.

use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::command::CommandChain;
use crate::error::ConfigError;

/// Default debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Configuration for the file watcher.
///
/// # Examples
///
/// ```
/// use war_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 250);
/// assert!(config.paths.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Paths to watch, in the order they were given.
    pub paths: Vec<Utf8PathBuf>,

    /// Debounce window in milliseconds.
    ///
    /// A path must go this long without a create or write event before its
    /// command chain runs.
    pub debounce_ms: u64,
}

impl WatchConfig {
    /// Returns the debounce window as a [`Duration`].
    #[inline]
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Root configuration for the `war` file watcher.
///
/// # Examples
///
/// ```
/// use war_core::{CommandChain, Config};
///
/// let config = Config::new(
///     vec!["/tmp/w".into()],
///     CommandChain::parse(["echo A", "echo B"]).unwrap(),
/// );
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File watcher configuration.
    pub watch: WatchConfig,

    /// Commands run, in order, whenever a watched path settles.
    ///
    /// May be empty, in which case a settled path is only logged.
    pub commands: CommandChain,
}

impl Config {
    /// Creates a configuration with the default debounce window.
    #[must_use]
    pub fn new(paths: Vec<Utf8PathBuf>, commands: CommandChain) -> Self {
        Self {
            watch: WatchConfig {
                paths,
                ..WatchConfig::default()
            },
            commands,
        }
    }

    /// Sets the debounce window in milliseconds.
    #[must_use]
    pub const fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.watch.debounce_ms = debounce_ms;
        self
    }

    /// Checks that the configuration can drive a watcher.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoWatchPaths`] if no path is configured
    /// - [`ConfigError::InvalidPath`] if a path is empty
    /// - [`ConfigError::InvalidOption`] if the debounce window is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch.paths.is_empty() {
            return Err(ConfigError::NoWatchPaths);
        }

        if let Some(path) = self.watch.paths.iter().find(|p| p.as_str().is_empty()) {
            return Err(ConfigError::InvalidPath {
                path: path.clone(),
                reason: "path is empty".to_owned(),
            });
        }

        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::invalid_option(
                "debounce_ms",
                "must be greater than zero",
            ));
        }

        Ok(())
    }
}
