//! Per-load state passed through every record reader.

use lic_model::{AbstractPart, AbstractPartId, ColorTable, PartStore};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::Result;

/// Everything one load builds up: the part dictionary being filled, the
/// colour table colours resolve against, and the problems found so far.
///
/// A context lives for exactly one load (or one template block) and is
/// consumed when the document is assembled.
#[derive(Debug)]
pub struct LoadContext {
    pub store: PartStore,
    pub colors: ColorTable,
    pub diagnostics: Diagnostics,
}

impl LoadContext {
    #[must_use]
    pub fn new(colors: ColorTable, strict: bool) -> Self {
        Self {
            store: PartStore::new(),
            colors,
            diagnostics: Diagnostics::new(strict),
        }
    }

    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) -> Result<()> {
        self.diagnostics.report(kind, message)
    }

    /// Add a dictionary entry; a repeated filename replaces the earlier
    /// entry and is reported.
    pub fn insert_entry(&mut self, part: AbstractPart) -> Result<AbstractPartId> {
        let filename = part.filename.clone();
        let (id, replaced) = self.store.insert(part);
        if replaced {
            self.report(
                DiagnosticKind::DuplicateEntry,
                format!("dictionary holds '{filename}' more than once; keeping the last entry"),
            )?;
        }
        Ok(id)
    }
}
