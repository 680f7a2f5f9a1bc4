//! Linking after load: dangling references, count mismatches, progress.

mod common;

use common::{BRICK_2X4, bricks, house, read, write};
use lic_format::{
    CURRENT_VERSION, DiagnosticKind, DocumentLoader, LicError, ProgressStep, ReaderOptions,
    WriterOptions, read_document, read_template, write_template,
};
use lic_model::{IDENTITY_MATRIX, Part, Pen, Rgba, Template};

fn with_missing_part() -> Vec<u8> {
    let mut doc = bricks();
    let main = doc.main_model;
    doc.add_part(main, 1, 1, Part::new("missing.dat", None, IDENTITY_MATRIX))
        .unwrap();
    write(&doc, CURRENT_VERSION)
}

#[test]
fn test_dangling_reference_is_a_diagnostic_when_lenient() {
    let loaded = read(&with_missing_part());
    // the placement, and the PLI item counting it
    assert_eq!(loaded.report.count(DiagnosticKind::UnresolvedReference), 2);
    let doc = &loaded.document;
    let step = doc.step(doc.main_model, 1, 1).unwrap();
    assert_eq!(step.csi.parts.len(), 4);
    let dangling = step
        .csi
        .parts
        .iter()
        .filter_map(|id| doc.store.instance(*id))
        .find(|p| p.filename == "missing.dat")
        .unwrap();
    assert!(dangling.abstract_part.is_none());
}

#[test]
fn test_dangling_reference_fails_when_strict() {
    let err = read_document(&with_missing_part(), &ReaderOptions::default().strict()).unwrap_err();
    assert!(matches!(err, LicError::UnresolvedReference { .. }), "{err}");
}

#[test]
fn test_stored_quantity_is_corrected() {
    let mut doc = bricks();
    let main = doc.main_model;
    let step = doc.step_mut(main, 1, 1).unwrap();
    let item = step
        .pli
        .as_mut()
        .and_then(|pli| pli.item_mut(BRICK_2X4, 4))
        .unwrap();
    item.quantity = 5;
    let bytes = write(&doc, CURRENT_VERSION);

    let loaded = read(&bytes);
    assert_eq!(loaded.report.count(DiagnosticKind::CountMismatch), 1);
    let doc = &loaded.document;
    let pli = doc.step(doc.main_model, 1, 1).unwrap().pli.as_ref().unwrap();
    assert_eq!(pli.items.iter().map(|i| i.quantity).collect::<Vec<_>>(), vec![2, 1]);

    let err = read_document(&bytes, &ReaderOptions::default().strict()).unwrap_err();
    assert!(matches!(err, LicError::CountMismatch { .. }), "{err}");
}

#[test]
fn test_part_shown_in_two_callouts_links_both_copies() {
    let mut doc = bricks();
    let main = doc.main_model;
    let original = doc.step(main, 1, 1).unwrap().csi.parts[0];
    for _ in 0..2 {
        let callout = doc.add_callout(main, 1, 1).unwrap();
        let callout_step = doc.add_callout_step(main, 1, 1, callout).unwrap();
        doc.copy_part_to_callout(main, 1, 1, callout, callout_step, original)
            .unwrap();
    }

    for version in [CURRENT_VERSION, 3] {
        let loaded = read(&write(&doc, version));
        assert!(loaded.report.is_clean(), "v{version}: {:?}", loaded.report);
        let doc = &loaded.document;
        let step = doc.step(doc.main_model, 1, 1).unwrap();
        let original = step
            .csi
            .parts
            .iter()
            .copied()
            .find(|id| doc.store.instance(*id).is_some_and(|p| p.in_callout))
            .unwrap();

        let copies: Vec<_> = step.callouts.iter().flat_map(|c| c.part_ids()).collect();
        assert_eq!(copies.len(), 2, "v{version}");
        for copy in &copies {
            let part = doc.store.instance(*copy).unwrap();
            assert_eq!(part.original_part, Some(original), "v{version}");
        }
        let linked = doc.store.instance(original).unwrap();
        assert_eq!(linked.callout_part, copies.last().copied(), "v{version}");
    }
}

#[test]
fn test_progress_steps_reach_announced_total() {
    let bytes = write(&house().doc, CURRENT_VERSION);
    let loader = DocumentLoader::new(bytes, &ReaderOptions::default()).unwrap();
    // template, two parts, one submodel, main model, linking
    assert_eq!(loader.total(), 6);

    let mut seen: Vec<ProgressStep> = Vec::new();
    let loaded = loader.run(&mut |step: &ProgressStep| seen.push(step.clone())).unwrap();
    assert_eq!(seen.len(), 6);
    assert_eq!(seen.last().map(|s| s.index), Some(6));
    assert!(seen.iter().all(|s| s.total == 6));
    assert_eq!(seen[3].label, "submodel wall.ldr");
    assert!(loaded.report.is_clean());
}

#[test]
fn test_loader_can_stop_early() {
    let bytes = write(&house().doc, CURRENT_VERSION);
    let mut loader = DocumentLoader::new(bytes, &ReaderOptions::default()).unwrap();
    let first = loader.next().unwrap().unwrap();
    assert_eq!(first.index, 1);
    assert!(first.label.starts_with("template"));
    assert!(!loader.is_done());
}

#[test]
fn test_truncated_stream_yields_no_document() {
    let bytes = write(&house().doc, CURRENT_VERSION);
    for cut in [7, bytes.len() / 3, bytes.len() / 2, bytes.len() - 1] {
        let result = read_document(&bytes[..cut], &ReaderOptions::default());
        assert!(
            matches!(result, Err(LicError::UnexpectedEof { .. })),
            "cut at {cut}: {result:?}"
        );
    }
}

#[test]
fn test_bad_magic_rejected() {
    let mut bytes = write(&bricks(), CURRENT_VERSION);
    bytes[0] = 0;
    let err = read_document(&bytes, &ReaderOptions::default()).unwrap_err();
    assert!(err.to_string().contains(".lic"), "{err}");
}

#[test]
fn test_template_file_round_trip() {
    let mut template = Template::new("studio.lit");
    template.styles.page_background = Rgba::rgb(250, 240, 200);
    template.styles.rotate_icon_arrow_pen = Pen::solid(Rgba::rgb(200, 0, 0), 2.0);

    for version in [CURRENT_VERSION, 19] {
        let bytes = write_template(&template, &WriterOptions::default().with_version(version)).unwrap();
        let loaded = read_template(&bytes, &ReaderOptions::default()).unwrap();
        assert!(loaded.report.is_clean(), "v{version}: {:?}", loaded.report);
        assert_eq!(loaded.report.version, version);
        assert_eq!(loaded.template.filename, "studio.lit");
        assert_eq!(loaded.template.styles, template.styles, "v{version}");
    }
}
