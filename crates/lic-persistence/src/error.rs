//! Persistence error types.
//!
//! Every error names the file involved and can be turned into a message
//! for the user plus an optional hint.

use std::path::{Path, PathBuf};

use lic_format::LicError;
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file does not exist.
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    /// The file is not a valid instruction book or template.
    #[error("Invalid file format: {path}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: LicError,
    },

    /// The file was written by a newer program.
    #[error("File version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion {
        found: i16,
        max_supported: i16,
        path: PathBuf,
    },

    /// The file is well-formed but its contents contradict each other.
    #[error("Inconsistent document: {path}")]
    Inconsistent {
        path: PathBuf,
        #[source]
        source: LicError,
    },

    /// The document could not be encoded at the requested version.
    #[error("Failed to encode {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: LicError,
    },

    /// The previous file could not be kept as a backup.
    #[error("Failed to back up {path}")]
    BackupFailed {
        path: PathBuf,
        backup_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    pub(crate) fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound && operation == "read" {
            return Self::NotFound {
                path: path.to_path_buf(),
            };
        }
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Classify a codec error raised while reading `path`.
    pub(crate) fn from_load(path: &Path, source: LicError) -> Self {
        let path = path.to_path_buf();
        match source {
            LicError::UnsupportedVersion {
                found,
                max_supported,
            } => Self::UnsupportedVersion {
                found,
                max_supported,
                path,
            },
            LicError::FileNotFound { path } => Self::NotFound { path },
            LicError::Io(source) => Self::Io {
                operation: "read",
                path,
                source,
            },
            LicError::UnresolvedReference { .. }
            | LicError::CountMismatch { .. }
            | LicError::Inconsistent { .. } => Self::Inconsistent { path, source },
            other => Self::InvalidFormat {
                path,
                source: other,
            },
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::NotFound { path } => {
                format!("The file {} does not exist.", path.display())
            }
            Self::InvalidFormat { path, source } => {
                format!(
                    "The file at {} is not a valid instruction book: {}",
                    path.display(),
                    source
                )
            }
            Self::UnsupportedVersion {
                found,
                max_supported,
                ..
            } => {
                format!(
                    "This file was created with a newer version of Lic \
                    (file version {found}, this version reads up to {max_supported})."
                )
            }
            Self::Inconsistent { path, source } => {
                format!("The file at {} refers to missing data: {}", path.display(), source)
            }
            Self::Encode { source, .. } => {
                format!("The document could not be saved in the requested format: {source}")
            }
            Self::BackupFailed { path, .. } => {
                format!("Could not keep a backup of {} before saving.", path.display())
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::NotFound { .. } => Some("Check the path and try again.".into()),
            Self::InvalidFormat { .. } => {
                Some("Make sure you selected a .lic instruction book or .lit template.".into())
            }
            Self::UnsupportedVersion { .. } => Some("Update Lic to open this file.".into()),
            Self::Inconsistent { .. } => {
                Some("Open the file without strict checking to repair what can be repaired.".into())
            }
            Self::Encode { .. } => {
                Some("Save at the current format version, or allow lossy downgrades.".into())
            }
            Self::BackupFailed { .. } => {
                Some("Save without keeping a backup, or free up disk space.".into())
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
