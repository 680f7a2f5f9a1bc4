//! How `check` settings reach the loader.

use lic_cli::settings::{LoadSettings, Settings};
use lic_format::DiagnosticKind;
use lic_model::{AbstractPart, Document, IDENTITY_MATRIX, Part};
use lic_persistence::{PersistenceError, SaveOptions, load_document, save_document};
use tempfile::tempdir;

fn with_missing_part() -> Document {
    let mut doc = Document::new("shed.ldr");
    doc.add_abstract_part(AbstractPart::new("3001.dat", "Brick  2 x  4"));
    let main = doc.main_model;
    doc.add_page(main, 1).unwrap();
    doc.add_step(main, 1, 1).unwrap();
    doc.add_part(main, 1, 1, Part::new("missing.dat", None, IDENTITY_MATRIX))
        .unwrap();
    doc
}

#[test]
fn test_lenient_settings_load_with_diagnostics() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shed.lic");
    save_document(&with_missing_part(), &path, &SaveOptions::default()).unwrap();

    let loaded = load_document(&path, &Settings::default().reader_options()).unwrap();
    assert_eq!(loaded.report.count(DiagnosticKind::UnresolvedReference), 2);
}

#[test]
fn test_strict_settings_fail_the_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shed.lic");
    save_document(&with_missing_part(), &path, &SaveOptions::default()).unwrap();

    let settings = Settings {
        load: LoadSettings { strict: true },
        ..Settings::default()
    };
    let err = load_document(&path, &settings.reader_options()).unwrap_err();
    assert!(matches!(err, PersistenceError::Inconsistent { .. }), "{err}");
    assert!(err.user_message().contains("missing data"));
}
