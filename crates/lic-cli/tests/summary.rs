//! Rendering of `inspect`, `check` and `gates` output.

use lic_cli::summary::{InspectSummary, diagnostics_table, gates_table, summary_table};
use lic_format::{ReaderOptions, WriterOptions, read_document, write_document};
use lic_model::{AbstractPart, Document, IDENTITY_MATRIX, Part};

fn bricks() -> Document {
    let mut doc = Document::new("bricks.ldr");
    doc.add_abstract_part(AbstractPart::new("3001.dat", "Brick  2 x  4"));
    let main = doc.main_model;
    doc.add_page(main, 1).unwrap();
    doc.add_step(main, 1, 1).unwrap();
    for code in [4, 4, 1] {
        let color = doc.colors.get(code).cloned();
        doc.add_part(main, 1, 1, Part::new("3001.dat", color, IDENTITY_MATRIX))
            .unwrap();
    }
    doc
}

fn inspect(doc: &Document) -> InspectSummary {
    let bytes = write_document(doc, &WriterOptions::default()).unwrap();
    let loaded = read_document(&bytes, &ReaderOptions::default()).unwrap();
    InspectSummary::new(&loaded)
}

#[test]
fn test_inspect_json() {
    insta::assert_json_snapshot!(inspect(&bricks()), @r#"
    {
      "filename": "bricks.ldr",
      "version": 23,
      "parts": 1,
      "submodels": 0,
      "pages": 1,
      "steps": 1,
      "callouts": 0,
      "part_instances": 3,
      "pli_items": 2,
      "title_page": false,
      "part_list_pages": 0,
      "guides": 0,
      "template": "default_template.lit",
      "diagnostics": []
    }
    "#);
}

#[test]
fn test_inspect_reports_dangling_part() {
    let mut doc = bricks();
    let main = doc.main_model;
    doc.add_part(main, 1, 1, Part::new("missing.dat", None, IDENTITY_MATRIX))
        .unwrap();
    let summary = inspect(&doc);

    insta::assert_json_snapshot!(summary.diagnostics, @r#"
    [
      {
        "kind": "unresolved_reference",
        "message": "no dictionary entry for 'missing.dat' (1 placements)"
      },
      {
        "kind": "unresolved_reference",
        "message": "no dictionary entry for PLI item 'missing.dat' (1 items)"
      }
    ]
    "#);

    let table = diagnostics_table(&summary.diagnostics).unwrap().to_string();
    assert!(table.contains("unresolved_reference"));
    assert!(table.contains("missing.dat"));
}

#[test]
fn test_summary_table_lists_counts() {
    let table = summary_table(&inspect(&bricks())).to_string();
    for label in ["bricks.ldr", "Format version", "Part instances", "default_template.lit"] {
        assert!(table.contains(label), "missing {label}:\n{table}");
    }
    assert!(diagnostics_table(&[]).is_none());
}

#[test]
fn test_gates_table_marks_version() {
    let all = gates_table(None).to_string();
    assert!(all.contains("ProgressCount"));
    assert!(all.contains(">= 14"));
    assert!(all.contains("< 20"));

    let old = gates_table(Some(3)).to_string();
    assert!(old.contains("v3"));
    assert!(old.contains("✓"));
    assert_eq!(old.lines().filter(|l| l.contains("ColorCode")).count(), 1);
}
