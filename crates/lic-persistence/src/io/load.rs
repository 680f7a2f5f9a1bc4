//! Loading operations.

use std::fs;
use std::path::Path;

use lic_format::{
    DocumentLoader, LoadedDocument, LoadedTemplate, ProgressSink, ProgressStep, ReaderOptions,
    read_template,
};

use crate::error::{PersistenceError, Result};

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| PersistenceError::io("read", path, e))
}

/// Open a `.lic` file for step-wise loading.
///
/// The header is validated here; iterate the returned loader to report
/// progress, then call [`DocumentLoader::finish`]. Errors raised while
/// iterating are codec errors; [`load_document`] classifies them per file.
pub fn open_document(path: &Path, options: &ReaderOptions) -> Result<DocumentLoader> {
    let bytes = read_bytes(path)?;
    DocumentLoader::new(bytes, options).map_err(|e| PersistenceError::from_load(path, e))
}

/// Load and link a `.lic` file.
pub fn load_document(path: &Path, options: &ReaderOptions) -> Result<LoadedDocument> {
    load_document_with_progress(path, options, &mut |_: &ProgressStep| {})
}

/// Load and link a `.lic` file, reporting each loading step to `sink`.
pub fn load_document_with_progress(
    path: &Path,
    options: &ReaderOptions,
    sink: &mut impl ProgressSink,
) -> Result<LoadedDocument> {
    let loaded = open_document(path, options)?
        .run(sink)
        .map_err(|e| PersistenceError::from_load(path, e))?;
    tracing::info!(
        "Loaded {} (version {}, {} diagnostics)",
        path.display(),
        loaded.report.version,
        loaded.report.diagnostics.len()
    );
    Ok(loaded)
}

/// Load a `.lit` template file.
pub fn load_template(path: &Path, options: &ReaderOptions) -> Result<LoadedTemplate> {
    let bytes = read_bytes(path)?;
    let loaded = read_template(&bytes, options).map_err(|e| PersistenceError::from_load(path, e))?;
    tracing::info!("Loaded template from {}", path.display());
    Ok(loaded)
}
