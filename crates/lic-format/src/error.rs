//! Error types for codec operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing `.lic` / `.lit` streams.
#[derive(Debug, Error)]
pub enum LicError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Structurally invalid stream (bad magic, bad record contents).
    #[error("invalid {kind} file: {message}")]
    InvalidFormat { kind: &'static str, message: String },

    /// Stream written by a newer format version than this reader knows.
    #[error("file version {found} is newer than the newest supported version {max_supported}")]
    UnsupportedVersion { found: i16, max_supported: i16 },

    /// Stream ended inside a record.
    #[error("unexpected end of data at offset {offset} (needed {needed} more bytes)")]
    UnexpectedEof { offset: usize, needed: usize },

    /// A name did not resolve (strict mode only).
    #[error("unresolved reference: {message}")]
    UnresolvedReference { message: String },

    /// Stored and actual counts disagree (strict mode only).
    #[error("count mismatch: {message}")]
    CountMismatch { message: String },

    /// Any other inconsistency that lenient loading would only log.
    #[error("inconsistent document: {message}")]
    Inconsistent { message: String },

    /// Data that the requested output version cannot hold.
    #[error("{what} cannot be stored in format version {version}")]
    UnrepresentableAtVersion { what: &'static str, version: i16 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, LicError>;

impl LicError {
    /// Create an InvalidFormat error for a `.lic` stream.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            kind: ".lic",
            message: message.into(),
        }
    }

    /// Create an InvalidFormat error for a `.lit` stream.
    pub fn invalid_template(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            kind: ".lit",
            message: message.into(),
        }
    }

    /// Whether the error is caused by the data rather than the environment.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat { .. } | Self::UnsupportedVersion { .. } | Self::UnexpectedEof { .. }
        )
    }
}
