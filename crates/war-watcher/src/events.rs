//! Event types for file change notifications.
//!
//! Raw `notify` events are converted into [`WatchEvent`]s as soon as they
//! leave the OS watcher. Only [`EventKind::Create`] and [`EventKind::Write`]
//! are relevant to the debounce engine; everything else is dropped by the
//! event loop.
//!
//! # Event Flow
//!
//! ```text
//! File System Change
//!        │
//!        ▼
//!   notify watcher (non-recursive)
//!        │
//!        ▼
//!   WatchEvent { path, kind }
//!        │
//!        ▼
//!   event loop ──► debounce table ──► command chain
//! ```

use std::fmt;

use camino::Utf8PathBuf;
use notify::event::ModifyKind;

/// The kind of change a [`WatchEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A file or directory was created.
    Create,
    /// File contents were written.
    Write,
    /// A file or directory was removed.
    Remove,
    /// A file or directory was renamed.
    Rename,
    /// Only permissions or other metadata changed.
    Chmod,
    /// Access events and anything the platform could not classify.
    Other,
}

impl EventKind {
    /// Returns `true` for the kinds that start or extend a debounce cycle.
    ///
    /// # Examples
    ///
    /// ```
    /// use war_watcher::EventKind;
    ///
    /// assert!(EventKind::Write.is_relevant());
    /// assert!(!EventKind::Remove.is_relevant());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_relevant(self) -> bool {
        matches!(self, Self::Create | Self::Write)
    }

    /// Returns the upper-case label used in log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Write => "WRITE",
            Self::Remove => "REMOVE",
            Self::Rename => "RENAME",
            Self::Chmod => "CHMOD",
            Self::Other => "OTHER",
        }
    }
}

impl From<&notify::EventKind> for EventKind {
    fn from(kind: &notify::EventKind) -> Self {
        use notify::EventKind as N;

        match kind {
            N::Create(_) => Self::Create,
            N::Modify(ModifyKind::Data(_) | ModifyKind::Any) => Self::Write,
            N::Modify(ModifyKind::Name(_)) => Self::Rename,
            N::Modify(ModifyKind::Metadata(_)) => Self::Chmod,
            N::Remove(_) => Self::Remove,
            N::Modify(ModifyKind::Other) | N::Access(_) | N::Any | N::Other => Self::Other,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single filesystem change on one path.
///
/// # Examples
///
/// ```
/// use war_watcher::{EventKind, WatchEvent};
///
/// let event = WatchEvent::new("/tmp/w", EventKind::Write);
/// assert_eq!(event.to_string(), r#""/tmp/w": WRITE"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// The path that changed, as reported by the OS watcher.
    pub path: Utf8PathBuf,

    /// What happened to the path.
    pub kind: EventKind,
}

impl WatchEvent {
    /// Creates a new event.
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, kind: EventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Returns `true` if this event should start or extend a debounce cycle.
    #[inline]
    #[must_use]
    pub const fn is_relevant(&self) -> bool {
        self.kind.is_relevant()
    }
}

impl fmt::Display for WatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": {}", self.path, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

    #[test]
    fn test_only_create_and_write_are_relevant() {
        assert!(EventKind::Create.is_relevant());
        assert!(EventKind::Write.is_relevant());
        assert!(!EventKind::Remove.is_relevant());
        assert!(!EventKind::Rename.is_relevant());
        assert!(!EventKind::Chmod.is_relevant());
        assert!(!EventKind::Other.is_relevant());
    }

    #[test]
    fn test_from_notify_kind() {
        use notify::EventKind as N;

        let cases = [
            (N::Create(CreateKind::File), EventKind::Create),
            (N::Modify(ModifyKind::Data(DataChange::Content)), EventKind::Write),
            (N::Modify(ModifyKind::Any), EventKind::Write),
            (N::Modify(ModifyKind::Name(RenameMode::From)), EventKind::Rename),
            (N::Modify(ModifyKind::Metadata(MetadataKind::Permissions)), EventKind::Chmod),
            (N::Remove(RemoveKind::File), EventKind::Remove),
            (N::Access(AccessKind::Any), EventKind::Other),
        ];

        for (raw, expected) in cases {
            assert_eq!(EventKind::from(&raw), expected, "{raw:?}");
        }
    }

    #[test]
    fn test_event_display() {
        let event = WatchEvent::new("/tmp/w", EventKind::Create);
        assert_snapshot!(event.to_string(), @r#""/tmp/w": CREATE"#);
    }
}
