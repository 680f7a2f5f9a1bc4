//! Property tests: random single-model documents survive a round trip at
//! any supported version.

mod common;

use common::{BRICK_2X2, BRICK_2X4, brick, read, write};
use lic_format::{CURRENT_VERSION, FIRST_VERSION};
use lic_model::{AbstractPart, Document, Step};
use proptest::prelude::*;

const PAGES: i32 = 3;
const STEPS: i32 = 2;

/// (filename, colour code, page, step, x offset)
type Placement = (&'static str, i32, i32, i32, f32);

fn arb_placement() -> impl Strategy<Value = Placement> {
    (
        prop::sample::select(vec![BRICK_2X4, BRICK_2X2]),
        prop::sample::select(vec![1, 4, 14, 15]),
        1..=PAGES,
        1..=STEPS,
        -200.0..200.0f32,
    )
}

fn build(placements: &[Placement]) -> Document {
    let mut doc = Document::new("random.ldr");
    doc.add_abstract_part(AbstractPart::new(BRICK_2X4, "Brick  2 x  4"));
    doc.add_abstract_part(AbstractPart::new(BRICK_2X2, "Brick  2 x  2"));
    let main = doc.main_model;
    for page in 1..=PAGES {
        doc.add_page(main, page).unwrap();
        for step in 1..=STEPS {
            doc.add_step(main, page, step).unwrap();
        }
    }
    for &(filename, code, page, step, x) in placements {
        let part = brick(&doc, filename, code, x);
        doc.add_part(main, page, step, part).unwrap();
    }
    doc
}

fn pli_matches_csi(doc: &Document, step: &Step) -> bool {
    let in_pli = step
        .csi
        .parts
        .iter()
        .filter_map(|id| doc.store.instance(*id))
        .filter(|p| p.is_in_pli)
        .count() as i32;
    let listed = step.pli.as_ref().map_or(0, |pli| pli.total_quantity());
    in_pli == listed
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_document_round_trips(
        placements in prop::collection::vec(arb_placement(), 0..16),
        version in FIRST_VERSION..=CURRENT_VERSION,
    ) {
        let doc = build(&placements);
        let expected = doc.stats();

        let loaded = read(&write(&doc, version));
        prop_assert!(loaded.report.is_clean(), "{:?}", loaded.report.diagnostics);
        let doc = loaded.document;

        let mut stats = doc.stats();
        prop_assert_eq!(stats.version, Some(version));
        stats.version = None;
        prop_assert_eq!(stats, expected);

        let main = doc.main_model().and_then(AbstractPart::submodel).unwrap();
        for page in &main.pages {
            for step in &page.steps {
                prop_assert!(pli_matches_csi(&doc, step), "page {} step {}", page.number, step.number);
            }
        }
        prop_assert!(doc.store.instances().all(|(_, p)| p.abstract_part.is_some()));
    }

    #[test]
    fn rewrite_is_stable(
        placements in prop::collection::vec(arb_placement(), 1..8),
        version in FIRST_VERSION..=CURRENT_VERSION,
    ) {
        let first = write(&build(&placements), version);
        let second = write(&read(&first).document, version);
        prop_assert_eq!(first, second);
    }
}
