use lic_model::{
    AbstractPart, Document, IDENTITY_MATRIX, ModelError, ParentRef, Part, PartInstanceId,
};

fn brick(doc: &Document, code: i32) -> Part {
    Part::new("3001.dat", doc.colors.get(code).cloned(), IDENTITY_MATRIX)
}

#[test]
fn test_builder_rejects_missing_targets() {
    let mut doc = Document::new("tower.ldr");
    let plain = doc.add_abstract_part(AbstractPart::new("3001.dat", "Brick  2 x  4"));
    let main = doc.main_model;

    assert!(matches!(doc.add_step(main, 1, 1), Err(ModelError::UnknownPage { page: 1, .. })));
    assert_eq!(
        doc.add_submodel("wing.ldr", "Wing", plain),
        Err(ModelError::NotASubmodel("3001.dat".to_string()))
    );
    doc.add_page(main, 1).unwrap();
    let part = brick(&doc, 4);
    assert_eq!(
        doc.add_part(main, 1, 3, part),
        Err(ModelError::UnknownStep { page: 1, step: 3 })
    );
    assert_eq!(doc.store.instance_count(), 0);
}

#[test]
fn test_nested_submodels_record_parents() {
    let mut doc = Document::new("tower.ldr");
    let main = doc.main_model;
    let base = doc.add_submodel("base.ldr", "Base", main).unwrap();
    let door = doc.add_submodel("door.ldr", "Door", base).unwrap();

    let base_data = doc.submodel(base).unwrap();
    assert_eq!(base_data.parent, ParentRef::MainModel);
    assert_eq!(base_data.parent_name, "tower.ldr");
    assert_eq!(base_data.submodel_names, vec!["door.ldr".to_string()]);

    let door_data = doc.submodel(door).unwrap();
    assert_eq!(door_data.parent, ParentRef::Submodel(base));
    assert_eq!(door_data.parent_name, "base.ldr");
    assert_eq!(doc.model_ids(), vec![main, base, door]);
}

#[test]
fn test_cumulative_parts_across_pages() {
    let mut doc = Document::new("tower.ldr");
    doc.add_abstract_part(AbstractPart::new("3001.dat", "Brick  2 x  4"));
    let main = doc.main_model;
    let mut added: Vec<PartInstanceId> = Vec::new();
    for page in 1..=2 {
        doc.add_page(main, page).unwrap();
        for step in 1..=2 {
            doc.add_step(main, page, step).unwrap();
            let part = brick(&doc, 1);
            added.push(doc.add_part(main, page, step, part).unwrap());
        }
    }

    assert_eq!(doc.cumulative_parts(main, 1, 1).unwrap(), added[..1]);
    assert_eq!(doc.cumulative_parts(main, 2, 1).unwrap(), added[..3]);
    assert_eq!(doc.cumulative_parts(main, 2, 2).unwrap(), added);
    assert!(doc.cumulative_parts(main, 3, 1).is_err());

    assert_eq!(doc.remove_page(main, 2), Err(ModelError::PageNotEmpty(2)));
    let stats = doc.stats();
    assert_eq!((stats.pages, stats.steps, stats.part_instances), (2, 4, 4));
}
