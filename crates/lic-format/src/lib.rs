//! Versioned binary codec for `.lic` instruction books and `.lit`
//! templates.
//!
//! A stream is a big-endian sequence of typed values behind a six-byte
//! header (magic number, format version). Twenty-three versions exist;
//! which fields a record carries depends on the version and is listed once,
//! in [`gates::GATES`].
//!
//! # Reading
//!
//! ```no_run
//! use lic_format::{ReaderOptions, read_document};
//!
//! let bytes = std::fs::read("house.lic")?;
//! let loaded = read_document(&bytes, &ReaderOptions::default())?;
//! println!("{} diagnostics", loaded.report.diagnostics.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Use [`DocumentLoader`] directly to observe progress while loading.
//!
//! # Writing
//!
//! ```no_run
//! use lic_format::{WriterOptions, write_document};
//! use lic_model::Document;
//!
//! let doc = Document::new("house.ldr");
//! let bytes = write_document(&doc, &WriterOptions::default().with_version(19))?;
//! # Ok::<(), lic_format::LicError>(())
//! ```

pub mod context;
pub mod diagnostics;
pub mod error;
pub mod gates;
pub mod header;
pub mod link;
pub mod loader;
pub mod options;
pub mod reader;
pub mod stream;
pub mod writer;

pub use context::LoadContext;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, LoadReport};
pub use error::{LicError, Result};
pub use gates::{Field, GATES, Gate, Presence};
pub use header::{HEADER_LEN, read_header, write_header};
pub use link::link_document;
pub use loader::{DocumentLoader, LoadedDocument, ProgressSink, ProgressStep, read_document};
pub use options::{
    ADVISORY_PROGRESS_TOTAL, CURRENT_VERSION, FIRST_VERSION, FileKind, MAGIC_NUMBER,
    ReaderOptions, WriterOptions,
};
pub use reader::{LoadedTemplate, read_template};
pub use stream::{StreamReader, StreamWriter};
pub use writer::{DEFAULT_TEMPLATE_NAME, LicWriter, write_document, write_template};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
