//! Error types for the war-core crate.
//!
//! This module provides the [`ConfigError`] type for configuration-related
//! errors. Every variant is a startup error: the process reports it and exits
//! before any path is watched.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration assembly and validation.
///
/// # Examples
///
/// ```
/// use war_core::ConfigError;
///
/// let error = ConfigError::EmptyCommand { index: 2 };
/// assert!(error.to_string().contains("#3"));
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No path was given to watch.
    #[error("must specify at least one path to watch (-d <path>)")]
    NoWatchPaths,

    /// The command line is too short to name a path and an action.
    #[error("must specify at least one -d path -r action (got {given} arguments)")]
    TooFewArguments {
        /// Number of arguments given, not counting the program name.
        given: usize,
    },

    /// A command string contained nothing but whitespace.
    #[error("command #{} is empty", .index + 1)]
    EmptyCommand {
        /// Zero-based position of the command in the chain.
        index: usize,
    },

    /// A watched path is invalid or malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path.
        path: Utf8PathBuf,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[must_use]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_is_one_based() {
        let error = ConfigError::EmptyCommand { index: 0 };
        assert_eq!(error.to_string(), "command #1 is empty");
    }

    #[test]
    fn test_invalid_path_display() {
        let error = ConfigError::InvalidPath {
            path: Utf8PathBuf::from("/invalid/path"),
            reason: "path is empty".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("/invalid/path"));
        assert!(msg.contains("path is empty"));
    }

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::invalid_option("debounce_ms", "must be positive");
        let msg = error.to_string();
        assert!(msg.contains("debounce_ms"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_missing_flags_mention_the_flag() {
        assert!(ConfigError::NoWatchPaths.to_string().contains("-d"));
        let short = ConfigError::TooFewArguments { given: 2 }.to_string();
        assert!(short.contains("-d") && short.contains("-r"));
        assert!(short.contains("got 2 arguments"));
    }
}
