//! Resumable document loading.
//!
//! [`DocumentLoader`] reads a `.lic` stream one unit of work at a time:
//! the template, each dictionary entry, each submodel, the main model, and
//! finally linking. Iterating the loader yields a [`ProgressStep`] per unit,
//! so callers can drive a progress bar or stop early. Nothing is visible to
//! the caller until [`DocumentLoader::finish`] returns the linked document.

use tracing::{debug, info};

use lic_model::{AbstractPart, ColorTable, Document, PartStore, StaticInfo, Template};

use crate::context::LoadContext;
use crate::diagnostics::LoadReport;
use crate::error::{LicError, Result};
use crate::gates::Field;
use crate::header::{HEADER_LEN, read_header};
use crate::link::link_document;
use crate::options::{ADVISORY_PROGRESS_TOTAL, FileKind, ReaderOptions};
use crate::reader::{
    read_abstract_part, read_guides, read_part_list_page, read_static_info, read_submodel,
    read_template_block, read_title_page,
};
use crate::stream::StreamReader;

/// One completed unit of loading work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStep {
    /// Units completed so far, starting at 1.
    pub index: usize,
    /// Units the stream announced. Older streams carry no count and use an
    /// advisory total, which the index may never reach.
    pub total: usize,
    pub label: String,
}

/// Receiver for load progress.
pub trait ProgressSink {
    fn progress(&mut self, step: &ProgressStep);
}

impl<F: FnMut(&ProgressStep)> ProgressSink for F {
    fn progress(&mut self, step: &ProgressStep) {
        self(step);
    }
}

/// A linked document plus what went wrong on the way.
#[derive(Debug)]
pub struct LoadedDocument {
    pub document: Document,
    pub report: LoadReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Template,
    Parts { remaining: usize },
    Submodels { remaining: usize },
    MainModel,
    Link,
    Done,
    Failed,
}

/// Step-wise reader of a `.lic` stream.
#[derive(Debug)]
pub struct DocumentLoader {
    data: Vec<u8>,
    pos: usize,
    version: i16,
    total: usize,
    index: usize,
    stage: Stage,
    ctx: LoadContext,
    template: Option<Template>,
    filename: String,
    static_info: StaticInfo,
    document: Option<Document>,
}

impl DocumentLoader {
    /// Validate the header and prepare to load. Fails without reading any
    /// record when the magic number or version is wrong.
    pub fn new(data: Vec<u8>, options: &ReaderOptions) -> Result<Self> {
        Self::with_colors(data, options, ColorTable::ldraw())
    }

    /// Load against a custom colour table.
    pub fn with_colors(data: Vec<u8>, options: &ReaderOptions, colors: ColorTable) -> Result<Self> {
        let version = read_header(&data, FileKind::Document, options)?;
        let mut reader = StreamReader::at(&data, HEADER_LEN, version);
        let total = if reader.has(Field::ProgressCount) {
            reader.read_count()?
        } else {
            ADVISORY_PROGRESS_TOTAL
        };
        let pos = reader.position();
        debug!(version, total, "opened document stream");

        Ok(Self {
            data,
            pos,
            version,
            total,
            index: 0,
            stage: Stage::Template,
            ctx: LoadContext::new(colors, options.strict),
            template: None,
            filename: String::new(),
            static_info: StaticInfo::default(),
            document: None,
        })
    }

    #[must_use]
    pub fn version(&self) -> i16 {
        self.version
    }

    /// Announced number of progress steps.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// True once the document is linked and ready for [`finish`](Self::finish).
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Run the remaining steps and hand over the linked document.
    pub fn finish(mut self) -> Result<LoadedDocument> {
        if self.stage == Stage::Failed {
            return Err(LicError::invalid_format("load was aborted by an earlier error"));
        }
        while self.advance()?.is_some() {}

        let LoadContext { diagnostics, .. } = self.ctx;
        let document = self
            .document
            .ok_or_else(|| LicError::invalid_format("stream ended before the main model"))?;
        info!(
            version = self.version,
            filename = %document.filename,
            diagnostics = diagnostics.len(),
            "loaded document"
        );
        Ok(LoadedDocument {
            document,
            report: LoadReport {
                version: self.version,
                diagnostics: diagnostics.into_vec(),
            },
        })
    }

    /// Drive the load to completion, reporting each step to `sink`.
    pub fn run(mut self, sink: &mut impl ProgressSink) -> Result<LoadedDocument> {
        while let Some(step) = self.next() {
            sink.progress(&step?);
        }
        self.finish()
    }

    fn completed(&mut self, label: String) -> Option<ProgressStep> {
        self.index += 1;
        Some(ProgressStep {
            index: self.index,
            total: self.total,
            label,
        })
    }

    /// Perform one unit of work. Stage changes that read only a count do
    /// not count as a step.
    fn advance(&mut self) -> Result<Option<ProgressStep>> {
        loop {
            let mut r = StreamReader::at(&self.data, self.pos, self.version);
            match self.stage {
                Stage::Template => {
                    let strict = self.ctx.diagnostics.is_strict();
                    let (template, diagnostics) =
                        read_template_block(&mut r, &self.ctx.colors, strict)?;
                    self.ctx.diagnostics.merge(diagnostics);
                    let label = format!("template {}", template.filename);
                    self.template = Some(template);
                    self.filename = r.read_string()?;
                    self.static_info = read_static_info(&mut r)?;
                    let remaining = r.read_count()?;
                    self.pos = r.position();
                    self.stage = Stage::Parts { remaining };
                    return Ok(self.completed(label));
                }
                Stage::Parts { remaining: 0 } => {
                    // Dictionary submodels from 6 on, the inline list before;
                    // both sit here as a count and submodel records.
                    let remaining = r.read_count()?;
                    self.pos = r.position();
                    self.stage = Stage::Submodels { remaining };
                }
                Stage::Parts { remaining } => {
                    let part = read_abstract_part(&mut r, &mut self.ctx)?;
                    self.pos = r.position();
                    let label = format!("part {}", part.filename);
                    self.ctx.insert_entry(part)?;
                    self.stage = Stage::Parts {
                        remaining: remaining - 1,
                    };
                    return Ok(self.completed(label));
                }
                Stage::Submodels { remaining: 0 } => {
                    self.stage = Stage::MainModel;
                }
                Stage::Submodels { remaining } => {
                    let submodel = read_submodel(&mut r, &mut self.ctx)?;
                    self.pos = r.position();
                    let label = format!("submodel {}", submodel.filename);
                    self.ctx.insert_entry(submodel)?;
                    self.stage = Stage::Submodels {
                        remaining: remaining - 1,
                    };
                    return Ok(self.completed(label));
                }
                Stage::MainModel => {
                    let document = read_main_model(
                        &mut r,
                        &mut self.ctx,
                        std::mem::take(&mut self.filename),
                        std::mem::take(&mut self.static_info),
                        self.template.take(),
                    )?;
                    self.pos = r.position();
                    if r.remaining() > 0 {
                        debug!(trailing = r.remaining(), "ignoring bytes after the guides");
                    }
                    let label = format!("model {}", document.filename);
                    self.document = Some(document);
                    self.stage = Stage::Link;
                    return Ok(self.completed(label));
                }
                Stage::Link => {
                    if let Some(document) = self.document.as_mut() {
                        link_document(document, &mut self.ctx.diagnostics)?;
                    }
                    self.stage = Stage::Done;
                    return Ok(self.completed("linking".to_string()));
                }
                Stage::Done | Stage::Failed => return Ok(None),
            }
        }
    }
}

/// Read the main model and the document-level pages after it, and take
/// over the dictionary filled so far.
fn read_main_model(
    r: &mut StreamReader<'_>,
    ctx: &mut LoadContext,
    filename: String,
    static_info: StaticInfo,
    template: Option<Template>,
) -> Result<Document> {
    let mut main: AbstractPart = read_submodel(r, ctx)?;
    if let Some(data) = main.submodel_mut() {
        data.is_main = true;
        data.used = true;
    }
    let title_page = read_title_page(r, ctx)?;
    let mut part_list_pages = Vec::new();
    for _ in 0..r.read_count()? {
        part_list_pages.push(read_part_list_page(r, ctx)?);
    }
    let guides = read_guides(r)?;

    let mut store = std::mem::take(&mut ctx.store);
    let main_model = store.insert_unindexed(main);
    Ok(Document {
        filename,
        loaded_version: Some(r.version()),
        static_info,
        template,
        store,
        main_model,
        title_page,
        part_list_pages,
        guides,
        colors: ctx.colors.clone(),
    })
}

impl Iterator for DocumentLoader {
    type Item = Result<ProgressStep>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(step) => step.map(Ok),
            Err(err) => {
                self.stage = Stage::Failed;
                self.ctx.store = PartStore::new();
                self.document = None;
                Some(Err(err))
            }
        }
    }
}

/// Read a whole `.lic` stream.
pub fn read_document(data: &[u8], options: &ReaderOptions) -> Result<LoadedDocument> {
    DocumentLoader::new(data.to_vec(), options)?.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::MAGIC_NUMBER;

    fn header(version: i16) -> Vec<u8> {
        let mut data = MAGIC_NUMBER.to_be_bytes().to_vec();
        data.extend_from_slice(&version.to_be_bytes());
        data
    }

    #[test]
    fn test_bad_magic_fails_before_loading() {
        let mut data = header(23);
        data[0] ^= 0xFF;
        let err = DocumentLoader::new(data, &ReaderOptions::default()).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = DocumentLoader::new(header(24), &ReaderOptions::default()).unwrap_err();
        assert!(matches!(err, LicError::UnsupportedVersion { found: 24, .. }));
    }

    #[test]
    fn test_advisory_total_before_progress_count() {
        let loader = DocumentLoader::new(header(13), &ReaderOptions::default()).unwrap();
        assert_eq!(loader.total(), ADVISORY_PROGRESS_TOTAL);
        assert_eq!(loader.version(), 13);
    }

    #[test]
    fn test_truncated_stream_poisons_loader() {
        let mut data = header(23);
        data.extend_from_slice(&7_i32.to_be_bytes());
        let mut loader = DocumentLoader::new(data, &ReaderOptions::default()).unwrap();
        assert_eq!(loader.total(), 7);
        assert!(matches!(loader.next(), Some(Err(_))));
        assert!(loader.next().is_none());
        assert!(loader.finish().is_err());
    }
}
