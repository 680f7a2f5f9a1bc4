//! Recoverable problems found while loading.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::error::{LicError, Result};

/// Category of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A filename with no dictionary entry.
    UnresolvedReference,
    /// A stored count that disagrees with the linked parts.
    CountMismatch,
    /// A part whose page/step placement does not exist.
    UnplacedPart,
    /// Two dictionary entries with one filename.
    DuplicateEntry,
    /// A palette code missing from the colour table.
    UnknownColor,
    /// A template page without its sample callout or rotate icon.
    MissingTemplateItem,
    /// A submodel reachable from more than one parent.
    SubmodelTree,
}

impl DiagnosticKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnresolvedReference => "unresolved_reference",
            Self::CountMismatch => "count_mismatch",
            Self::UnplacedPart => "unplaced_part",
            Self::DuplicateEntry => "duplicate_entry",
            Self::UnknownColor => "unknown_color",
            Self::MissingTemplateItem => "missing_template_item",
            Self::SubmodelTree => "submodel_tree",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recoverable problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    /// The error raised for this problem in strict mode.
    #[must_use]
    pub fn into_error(self) -> LicError {
        match self.kind {
            DiagnosticKind::UnresolvedReference | DiagnosticKind::UnknownColor => {
                LicError::UnresolvedReference {
                    message: self.message,
                }
            }
            DiagnosticKind::CountMismatch => LicError::CountMismatch {
                message: self.message,
            },
            DiagnosticKind::UnplacedPart
            | DiagnosticKind::DuplicateEntry
            | DiagnosticKind::MissingTemplateItem
            | DiagnosticKind::SubmodelTree => LicError::Inconsistent {
                message: self.message,
            },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Collector that either records problems or, in strict mode, turns the
/// first one into an error.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    strict: bool,
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Record a problem, or fail in strict mode.
    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) -> Result<()> {
        let diagnostic = Diagnostic {
            kind,
            message: message.into(),
        };
        if self.strict {
            return Err(diagnostic.into_error());
        }
        warn!(kind = ?diagnostic.kind, "{}", diagnostic.message);
        self.items.push(diagnostic);
        Ok(())
    }

    /// Take over the problems collected by another pass.
    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Outcome of a successful load besides the document itself.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    /// Format version of the stream.
    pub version: i16,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of problems of one kind.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }
}
