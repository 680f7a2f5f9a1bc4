//! Documents shared by the integration tests.

#![allow(dead_code)]

use lic_format::{LoadedDocument, ReaderOptions, WriterOptions, read_document, write_document};
use lic_model::geometry::translation;
use lic_model::{
    AbstractPart, Annotation, DisplaceDirection, Document, Guide, IDENTITY_MATRIX, Label,
    LengthIndicator, Part, PartInstanceId, PartListPage, Pixmap, PointF, PreviewDimensions,
    Primitive, PrimitiveKind, QuantityLabel, RotateIcon, SubmodelPreview, TitleLabel, TitlePage,
};

pub const BRICK_2X4: &str = "3001.dat";
pub const BRICK_2X2: &str = "3003.dat";

pub fn brick(doc: &Document, filename: &str, code: i32, x: f32) -> Part {
    Part::new(filename, doc.colors.get(code).cloned(), translation(x, 0.0, 0.0))
}

/// One page, one step: two red and one blue 2x4 brick.
pub fn bricks() -> Document {
    let mut doc = Document::new("bricks.ldr");
    doc.add_abstract_part(AbstractPart::new(BRICK_2X4, "Brick  2 x  4"));
    let main = doc.main_model;
    doc.add_page(main, 1).unwrap();
    doc.add_step(main, 1, 1).unwrap();
    for (code, x) in [(4, 0.0), (4, 40.0), (1, 80.0)] {
        let part = brick(&doc, BRICK_2X4, code, x);
        doc.add_part(main, 1, 1, part).unwrap();
    }
    doc
}

/// [`bricks`] plus one item of every kind that only some versions store:
/// a length indicator, a rotate icon, custom page and step numbers, a
/// submodel preview with quantity and size, and a yellow brick kept out
/// of the PLI.
pub fn decorated() -> Document {
    let mut doc = bricks();
    let main = doc.main_model;
    let mut loose = brick(&doc, BRICK_2X4, 14, 120.0);
    loose.is_in_pli = false;
    doc.add_part(main, 1, 1, loose).unwrap();

    let step = doc.step_mut(main, 1, 1).unwrap();
    step.custom_number = Some(12);
    step.rotate_icon = Some(RotateIcon::default());
    if let Some(item) = step.pli.as_mut().and_then(|pli| pli.items.first_mut()) {
        item.length_indicator = Some(LengthIndicator {
            text: "6".to_string(),
            ..LengthIndicator::default()
        });
    }

    if let Some(page) = doc
        .store
        .get_mut(main)
        .and_then(AbstractPart::submodel_mut)
        .and_then(|data| data.page_mut(1))
    {
        page.custom_number = Some(7);
        page.submodel_item = Some(SubmodelPreview {
            quantity_label: Some(QuantityLabel {
                label: Label::default(),
                quantity: 3,
            }),
            dimensions: Some(PreviewDimensions {
                width: 210,
                height: 160,
                center_x: 105,
                center_y: 80,
            }),
            ..SubmodelPreview::default()
        });
    }
    doc
}

/// Handles into [`house`].
pub struct House {
    pub doc: Document,
    pub original: PartInstanceId,
    pub copy: PartInstanceId,
    pub displaced: PartInstanceId,
}

/// A main model with a submodel, a displaced part, a callout, a title
/// page, a part-list page, guides and an annotation.
pub fn house() -> House {
    let mut doc = Document::new("house.ldr");
    let mut brick_2x2 = AbstractPart::new(BRICK_2X2, "Brick  2 x  2");
    brick_2x2.primitives.push(Primitive::new(
        None,
        PrimitiveKind::Triangles,
        1,
        vec![0.0, 0.0, 0.0, 20.0, 0.0, 0.0, 0.0, 24.0, 0.0],
    ));
    brick_2x2.primitives.push(Primitive::new(
        doc.colors.get(0).cloned(),
        PrimitiveKind::Lines,
        0,
        vec![0.0, 0.0, 0.0, 20.0, 0.0, 0.0],
    ));
    brick_2x2.dimensions.width = 64;
    brick_2x2.dimensions.height = 48;
    doc.add_abstract_part(AbstractPart::new(BRICK_2X4, "Brick  2 x  4"));
    doc.add_abstract_part(brick_2x2);

    let main = doc.main_model;
    let wall = doc.add_submodel("wall.ldr", "Wall", main).unwrap();
    doc.add_page(wall, 1).unwrap();
    doc.add_step(wall, 1, 1).unwrap();
    for x in [0.0, 80.0] {
        let part = brick(&doc, BRICK_2X4, 4, x);
        doc.add_part(wall, 1, 1, part).unwrap();
    }

    doc.add_page(main, 2).unwrap();
    doc.add_step(main, 2, 1).unwrap();
    doc.add_step(main, 2, 2).unwrap();
    doc.add_part(main, 2, 1, Part::new("wall.ldr", None, IDENTITY_MATRIX))
        .unwrap();

    let mut roof = brick(&doc, BRICK_2X2, 14, 0.0);
    roof.displace(DisplaceDirection::UP, [0.0, -60.0, 0.0]);
    let displaced = doc.add_part(main, 2, 2, roof).unwrap();
    let door = brick(&doc, BRICK_2X4, 1, 40.0);
    let original = doc.add_part(main, 2, 2, door).unwrap();
    let callout = doc.add_callout(main, 2, 2).unwrap();
    let callout_step = doc.add_callout_step(main, 2, 2, callout).unwrap();
    let copy = doc
        .copy_part_to_callout(main, 2, 2, callout, callout_step, original)
        .unwrap();

    if let Some(page) = doc
        .store
        .get_mut(main)
        .and_then(AbstractPart::submodel_mut)
        .and_then(|data| data.page_mut(2))
    {
        page.annotations.push(Annotation::new(
            Pixmap::new(vec![0x89, b'P', b'N', b'G']),
            "logo.png",
            PointF::new(12.0, 12.0),
        ));
    }

    let mut title = TitlePage::default();
    title.labels.push(TitleLabel {
        pos: PointF::new(100.0, 40.0),
        font: Label::default().font,
        text: "Little House".to_string(),
    });
    doc.title_page = Some(title);
    doc.part_list_pages.push(PartListPage::new(3, 3));
    doc.guides.push(Guide {
        orientation: 1,
        pos: PointF::new(0.0, 300.0),
    });

    House {
        doc,
        original,
        copy,
        displaced,
    }
}

pub fn write(doc: &Document, version: i16) -> Vec<u8> {
    write_document(doc, &WriterOptions::default().with_version(version)).unwrap()
}

pub fn read(bytes: &[u8]) -> LoadedDocument {
    read_document(bytes, &ReaderOptions::default()).unwrap()
}
