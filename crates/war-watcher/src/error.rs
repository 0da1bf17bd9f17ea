//! Error types for the war-watcher crate.
//!
//! This module provides the [`WatchError`] type for errors that can occur
//! while registering paths and while the watcher is running.

use camino::Utf8PathBuf;
use war_core::ConfigError;

/// Errors that can occur during file watching operations.
///
/// # Where Errors Surface
///
/// - **Configuration errors** ([`WatchError::Config`]), **missing paths**
///   ([`WatchError::PathNotFound`]) and **registration errors**
///   ([`WatchError::Register`]) are returned by [`run`](crate::run) before
///   anything is watched
/// - **Notify errors** ([`WatchError::Notify`]) are returned the same way when
///   the platform watcher cannot be created, and are delivered on the error
///   stream once it is running
/// - **Non-UTF-8 paths** ([`WatchError::NonUtf8Path`]) are delivered on the
///   error stream in place of the event that carried them
///
/// Errors on the error stream are logged by the event loop, which keeps going.
///
/// # Examples
///
/// ```
/// use war_watcher::WatchError;
///
/// let err = WatchError::path_not_found("/tmp/missing");
/// assert_eq!(err.to_string(), "/tmp/missing: no such file or directory");
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WatchError {
    /// The configuration cannot drive a watcher.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The specified path does not exist.
    #[error("{0}: no such file or directory")]
    PathNotFound(Utf8PathBuf),

    /// The OS watcher refused to register a path.
    #[error("{path}: {source}")]
    Register {
        /// The path that could not be registered.
        path: Utf8PathBuf,
        /// The underlying watcher error.
        #[source]
        source: notify::Error,
    },

    /// The notify watcher failed to initialize or reported an internal error.
    #[error("{0}")]
    Notify(#[from] notify::Error),

    /// An event path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_path_not_found() {
        let err = WatchError::path_not_found("/tmp/missing");
        assert!(matches!(&err, WatchError::PathNotFound(path) if path == "/tmp/missing"));
        assert_eq!(err.to_string(), "/tmp/missing: no such file or directory");
    }

    #[test]
    fn test_register_names_the_path() {
        let err = WatchError::Register {
            path: Utf8PathBuf::from("/tmp/w"),
            source: notify::Error::generic("too many watches"),
        };
        assert!(err.to_string().starts_with("/tmp/w: "));
        assert!(err.to_string().contains("too many watches"));
    }

    #[test]
    fn test_notify_error_display() {
        let err = WatchError::from(notify::Error::generic("queue overflow"));
        assert!(err.to_string().contains("queue overflow"));
    }

    #[test]
    fn test_non_utf8_display() {
        let err = WatchError::NonUtf8Path(PathBuf::from("test"));
        assert_eq!(err.to_string(), "path is not valid UTF-8: test");
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err = WatchError::from(ConfigError::NoWatchPaths);
        assert_eq!(err.to_string(), ConfigError::NoWatchPaths.to_string());
    }
}
