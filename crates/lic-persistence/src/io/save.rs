//! Saving operations.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use lic_format::{CURRENT_VERSION, FileKind, WriterOptions, write_document, write_template};
use lic_model::{Document, Renderer, Template};

use crate::error::{PersistenceError, Result};

/// How a file is saved.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Format version to write (default: the current version).
    pub version: i16,
    /// Keep the file being replaced as `<stem>_bak.<ext>`.
    pub keep_backup: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            keep_backup: false,
        }
    }
}

impl SaveOptions {
    #[must_use]
    pub fn with_version(mut self, version: i16) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_backup(mut self, keep_backup: bool) -> Self {
        self.keep_backup = keep_backup;
        self
    }

    fn writer_options(&self) -> WriterOptions {
        WriterOptions::default().with_version(self.version)
    }
}

/// Where the previous version of `path` is kept: `castle.lic` becomes
/// `castle_bak.lic`.
#[must_use]
pub fn backup_path(path: &Path, kind: FileKind) -> PathBuf {
    let mut name = path.file_stem().map(OsString::from).unwrap_or_default();
    name.push("_bak.");
    name.push(kind.extension());
    path.with_file_name(name)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Save a document to a `.lic` file.
///
/// Uses atomic write (temp file + rename) to prevent data corruption
/// on crash or power loss.
pub fn save_document(doc: &Document, path: &Path, options: &SaveOptions) -> Result<()> {
    let bytes = write_document(doc, &options.writer_options()).map_err(|e| {
        PersistenceError::Encode {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    write_atomically(&bytes, path, FileKind::Document, options)?;
    tracing::info!("Saved {} (version {})", path.display(), options.version);
    Ok(())
}

/// Recompile whatever the document marks dirty, then save it.
///
/// Returns the number of CSIs that were rendered.
pub fn render_and_save<R: Renderer>(
    doc: &mut Document,
    renderer: &mut R,
    path: &Path,
    options: &SaveOptions,
) -> Result<usize> {
    let rendered = doc.refresh_dirty(renderer);
    tracing::debug!(rendered, "refreshed dirty CSIs before saving");
    save_document(doc, path, options)?;
    Ok(rendered)
}

/// Save a template to a `.lit` file.
pub fn save_template(template: &Template, path: &Path, options: &SaveOptions) -> Result<()> {
    let bytes = write_template(template, &options.writer_options()).map_err(|e| {
        PersistenceError::Encode {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    write_atomically(&bytes, path, FileKind::Template, options)?;
    tracing::info!("Saved template to {}", path.display());
    Ok(())
}

fn write_atomically(bytes: &[u8], path: &Path, kind: FileKind, options: &SaveOptions) -> Result<()> {
    // Write to a temp file first, then rename for atomicity
    let temp_path = temp_path(path);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| PersistenceError::io("create directory", parent, e))?;
    }

    write_temp_file(bytes, &temp_path)?;

    if options.keep_backup && path.exists() {
        let backup = backup_path(path, kind);
        fs::copy(path, &backup).map_err(|e| {
            // Leave the target untouched when the backup cannot be made.
            let _ = fs::remove_file(&temp_path);
            PersistenceError::BackupFailed {
                path: path.to_path_buf(),
                backup_path: backup.clone(),
                source: e,
            }
        })?;
        tracing::debug!("Kept backup at {}", backup.display());
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        PersistenceError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Write and sync `bytes` to `temp_path`. A partly written file is removed.
fn write_temp_file(bytes: &[u8], temp_path: &Path) -> Result<()> {
    let mut file =
        File::create(temp_path).map_err(|e| PersistenceError::io("create", temp_path, e))?;
    let written = file
        .write_all(bytes)
        .map_err(|e| PersistenceError::io("write", temp_path, e))
        .and_then(|()| {
            file.sync_all()
                .map_err(|e| PersistenceError::io("sync", temp_path, e))
        });
    drop(file);
    if written.is_err() {
        let _ = fs::remove_file(temp_path);
    }
    written
}
