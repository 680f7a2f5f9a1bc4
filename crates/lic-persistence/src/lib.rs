//! On-disk storage for Lic instruction books and templates.
//!
//! This crate wraps the stream codec in `lic-format` with file handling:
//!
//! - **Atomic writes**: data goes to `<file>.tmp`, is synced, then renamed
//!   over the target
//! - **Backups**: the previous file can be kept as `<stem>_bak.lic`
//! - **Render before save**: dirty CSIs are recompiled through a
//!   [`Renderer`](lic_model::Renderer) so the saved sizes are current
//! - **Readable errors**: every failure carries the path and offers
//!   [`PersistenceError::user_message`] and [`PersistenceError::suggestion`]
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use lic_format::ReaderOptions;
//! use lic_persistence::{SaveOptions, load_document, save_document};
//!
//! let loaded = load_document(Path::new("castle.lic"), &ReaderOptions::default())?;
//! for diagnostic in &loaded.report.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! save_document(&loaded.document, Path::new("castle.lic"), &SaveOptions::default())?;
//! # Ok::<(), lic_persistence::PersistenceError>(())
//! ```

mod error;
mod io;

pub use error::{PersistenceError, Result};
pub use io::{
    SaveOptions, backup_path, load_document, load_document_with_progress, load_template,
    open_document, render_and_save, save_document, save_template,
};
