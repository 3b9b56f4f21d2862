//! Error types for Swarmdeck.
//!
//! Stale references (a selection index past the end of a shrunken table, a
//! domain object no longer in a collection) are never errors; they surface as
//! `None`. Invariant violations are not errors either: they panic in debug
//! builds and are logged in release (see `swarmdeck_core::invariant`). The
//! variants here cover settings files, drag export and row cleanup.

use std::path::PathBuf;

/// Result type alias for Swarmdeck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Swarmdeck.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A settings document could not be parsed.
    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// Settings could not be serialized.
    #[error("failed to serialize settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),

    /// File I/O error.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A drag could not be started or completed.
    #[error("drag failed: {0}")]
    Drag(#[from] DragError),

    /// A row failed to release a resource it opened.
    #[error("cleanup of row '{row}' failed: {message}")]
    Cleanup { row: String, message: String },

    /// A lazily exported file could not be resolved at drop time.
    #[error("could not resolve '{name}': {message}")]
    Resolve { name: String, message: String },
}

impl Error {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a cleanup error.
    pub fn cleanup(row: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cleanup {
            row: row.into(),
            message: message.into(),
        }
    }

    /// Create a resolve error.
    pub fn resolve(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolve {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Drag-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    /// The platform cannot start drags from this widget.
    #[error("drag and drop is not supported on this platform")]
    Unsupported,
    /// Nothing in the selection can be exported.
    #[error("nothing to export")]
    EmptyPayload,
    /// The platform rejected the drag.
    #[error("platform drag error: {0}")]
    Platform(String),
}
