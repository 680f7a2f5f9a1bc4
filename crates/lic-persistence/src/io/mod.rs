//! File I/O for instruction books and templates.
//!
//! This module handles:
//! - Loading `.lic` and `.lit` files with format validation
//! - Saving with atomic writes and an optional backup
//! - Refreshing rendered state before a save

mod load;
mod save;

pub use load::{load_document, load_document_with_progress, load_template, open_document};
pub use save::{SaveOptions, backup_path, render_and_save, save_document, save_template};
