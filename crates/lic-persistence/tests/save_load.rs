//! Save/load through the filesystem.

use std::fs;

use lic_format::{FileKind, ReaderOptions};
use lic_model::{
    AbstractPart, Dimensions, DisplayItem, DisplayListId, Document, IDENTITY_MATRIX, Part, PointF,
    Primitive, Renderer, Template,
};
use lic_persistence::{
    PersistenceError, SaveOptions, backup_path, load_document, load_template, open_document,
    render_and_save, save_document, save_template,
};
use tempfile::tempdir;

fn book() -> Document {
    let mut doc = Document::new("book.ldr");
    doc.add_abstract_part(AbstractPart::new("3001.dat", "Brick  2 x  4"));
    let main = doc.main_model;
    doc.add_page(main, 1).unwrap();
    doc.add_step(main, 1, 1).unwrap();
    doc.add_step(main, 1, 2).unwrap();
    for step in [1, 2] {
        let color = doc.colors.get(4).cloned();
        doc.add_part(main, 1, step, Part::new("3001.dat", color, IDENTITY_MATRIX))
            .unwrap();
    }
    doc
}

/// Renders every image as 120x90.
#[derive(Default)]
struct FixedRenderer {
    lists: u32,
}

impl Renderer for FixedRenderer {
    type Buffer = ();

    fn compile_part(&mut self, _: &[Primitive], _: &[DisplayItem]) -> DisplayListId {
        self.lists += 1;
        DisplayListId(self.lists)
    }

    fn compile_csi(&mut self, _: Option<DisplayListId>, _: &[DisplayItem]) -> DisplayListId {
        self.lists += 1;
        DisplayListId(self.lists)
    }

    fn acquire(&mut self, _: u32) -> Option<()> {
        Some(())
    }

    fn measure(&mut self, _: &mut (), _: DisplayListId) -> Option<Dimensions> {
        Some(Dimensions {
            width: 120,
            height: 90,
            left_inset: 0,
            bottom_inset: 0,
            center: PointF::new(0.0, 0.0),
        })
    }

    fn release(&mut self, _: ()) {}
}

#[test]
fn test_document_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.lic");

    save_document(&book(), &path, &SaveOptions::default()).unwrap();
    let loaded = load_document(&path, &ReaderOptions::default()).unwrap();

    assert!(loaded.report.is_clean());
    assert_eq!(loaded.document.filename, "book.ldr");
    assert_eq!(loaded.document.store.instance_count(), 2);
}

#[test]
fn test_backup_keeps_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.lic");
    let options = SaveOptions::default().with_backup(true);

    save_document(&book(), &path, &options.clone().with_version(14)).unwrap();
    let first = fs::read(&path).unwrap();
    let backup = backup_path(&path, FileKind::Document);
    assert!(!backup.exists());

    save_document(&book(), &path, &options).unwrap();
    assert_eq!(fs::read(&backup).unwrap(), first);
    assert_ne!(fs::read(&path).unwrap(), first);

    let previous = load_document(&backup, &ReaderOptions::default()).unwrap();
    assert_eq!(previous.report.version, 14);
}

#[test]
fn test_render_before_save() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.lic");
    let mut doc = book();
    assert!(doc.has_dirty_csis());

    let rendered =
        render_and_save(&mut doc, &mut FixedRenderer::default(), &path, &SaveOptions::default())
            .unwrap();
    assert_eq!(rendered, 2);
    assert!(!doc.has_dirty_csis());

    let loaded = load_document(&path, &ReaderOptions::default()).unwrap();
    let doc = loaded.document;
    let step = doc.step(doc.main_model, 1, 2).unwrap();
    assert_eq!((step.csi.width, step.csi.height), (120, 90));
}

#[test]
fn test_progress_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.lic");
    save_document(&book(), &path, &SaveOptions::default()).unwrap();

    let mut loader = open_document(&path, &ReaderOptions::default()).unwrap();
    let total = loader.total();
    let steps: Vec<_> = loader.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(steps.len(), total);
    assert!(loader.finish().is_ok());
}

#[test]
fn test_strict_load_of_inconsistent_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dangling.lic");
    let mut doc = book();
    let main = doc.main_model;
    doc.add_part(main, 1, 1, Part::new("missing.dat", None, IDENTITY_MATRIX))
        .unwrap();
    save_document(&doc, &path, &SaveOptions::default()).unwrap();

    assert!(load_document(&path, &ReaderOptions::default()).is_ok());
    let err = load_document(&path, &ReaderOptions::default().strict()).unwrap_err();
    assert!(matches!(err, PersistenceError::Inconsistent { .. }));
    assert!(err.user_message().contains("dangling.lic"));
}

#[test]
fn test_template_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("studio.lit");
    let mut template = Template::new("studio.lit");
    template.separators_visible = false;

    save_template(&template, &path, &SaveOptions::default()).unwrap();
    let loaded = load_template(&path, &ReaderOptions::default()).unwrap();
    assert!(!loaded.template.separators_visible);
    assert_eq!(loaded.template.filename, "studio.lit");
}
