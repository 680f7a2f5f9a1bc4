//! Second pass over a freshly read graph.
//!
//! Reading leaves filenames where ids belong. Linking runs once the whole
//! stream is in memory, because entries may reference entries declared
//! later:
//!
//! 1. every part instance resolves its filename against the dictionary;
//! 2. starting at the main model, submodel names become ids and children
//!    are linked before their parent; placed parts join their step's CSI;
//! 3. parts shown in callouts are paired with their callout copies;
//! 4. PLI items are bound to the parts they count;
//! 5. submodel parents are resolved by name.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use lic_model::arena::Arena;
use lic_model::{
    AbstractPart, AbstractPartId, Document, ParentRef, Part, PartInstanceId, PartStore, Pli,
    PliItem, Step, Template, color_code,
};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::Result;

/// Link a document read by the loader.
pub fn link_document(doc: &mut Document, diagnostics: &mut Diagnostics) -> Result<()> {
    resolve_instances(&mut doc.store, diagnostics)?;

    let mut visited = HashSet::new();
    link_model(&mut doc.store, doc.main_model, &mut visited, diagnostics)?;

    // Submodels no model lists as a child still get their pages populated.
    let orphans: Vec<AbstractPartId> = doc
        .store
        .submodels()
        .map(|(id, _)| id)
        .filter(|id| !visited.contains(id))
        .collect();
    for id in orphans {
        if !visited.contains(&id) {
            debug!(model = %model_name(&doc.store, id), "linking submodel outside the model tree");
            link_model(&mut doc.store, id, &mut visited, diagnostics)?;
        }
    }

    for model in doc.model_ids() {
        reconcile_model_plis(&mut doc.store, model, diagnostics)?;
    }
    resolve_pli_items(doc, diagnostics)?;
    resolve_parents(doc, diagnostics)?;
    Ok(())
}

/// Link a template against its own dictionary. The sample model's parts
/// are shown in the first step of the template page.
pub(crate) fn link_template(template: &mut Template, diagnostics: &mut Diagnostics) -> Result<()> {
    resolve_instances(&mut template.store, diagnostics)?;

    let parts = template
        .store
        .get(template.submodel)
        .map(|model| model.parts.clone())
        .unwrap_or_default();
    match template.page.first_step_mut() {
        Some(step) => step.csi.parts.extend(parts),
        None if !parts.is_empty() => diagnostics.report(
            DiagnosticKind::MissingTemplateItem,
            "template page has no step to show its sample parts",
        )?,
        None => {}
    }

    let index = dictionary_index(&template.store);
    let mut missing = BTreeMap::new();
    template
        .page
        .page
        .visit_plis_mut(&mut |pli| bind_pli_items(pli, &index, &mut missing));
    report_missing_pli_items(missing, diagnostics)
}

fn model_name(store: &PartStore, id: AbstractPartId) -> String {
    store
        .get(id)
        .map_or_else(|| id.to_string(), |model| model.filename.clone())
}

/// Point every unresolved instance at its dictionary entry. Missing
/// filenames are reported once each.
fn resolve_instances(store: &mut PartStore, diagnostics: &mut Diagnostics) -> Result<()> {
    let pending: Vec<(PartInstanceId, String)> = store
        .instances()
        .filter(|(_, part)| part.abstract_part.is_none())
        .map(|(id, part)| (id, part.filename.clone()))
        .collect();

    let mut missing: BTreeMap<String, usize> = BTreeMap::new();
    for (id, filename) in pending {
        match store.lookup(&filename) {
            Some(target) => {
                if let Some(part) = store.instance_mut(id) {
                    part.abstract_part = Some(target);
                }
            }
            None => *missing.entry(filename).or_default() += 1,
        }
    }
    for (filename, count) in missing {
        diagnostics.report(
            DiagnosticKind::UnresolvedReference,
            format!("no dictionary entry for '{filename}' ({count} placements)"),
        )?;
    }
    Ok(())
}

fn mark_used(store: &mut PartStore, id: AbstractPartId) {
    if let Some(data) = store.get_mut(id).and_then(AbstractPart::submodel_mut) {
        data.used = true;
    }
}

/// Link one model and, first, every child it names.
fn link_model(
    store: &mut PartStore,
    model: AbstractPartId,
    visited: &mut HashSet<AbstractPartId>,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let name = model_name(store, model);
    if !visited.insert(model) {
        return diagnostics.report(
            DiagnosticKind::SubmodelTree,
            format!("submodel '{name}' is listed under more than one parent"),
        );
    }

    let child_names = store
        .get(model)
        .and_then(AbstractPart::submodel)
        .map(|data| data.submodel_names.clone())
        .unwrap_or_default();
    let mut children = Vec::with_capacity(child_names.len());
    for child in &child_names {
        match store.lookup(child) {
            Some(id) if store.get(id).is_some_and(AbstractPart::is_submodel) => {
                mark_used(store, id);
                children.push(id);
            }
            Some(_) => diagnostics.report(
                DiagnosticKind::UnresolvedReference,
                format!("'{name}' lists '{child}' as a submodel, but it is a plain part"),
            )?,
            None => diagnostics.report(
                DiagnosticKind::UnresolvedReference,
                format!("'{name}' lists submodel '{child}', which is not in the dictionary"),
            )?,
        }
    }
    if let Some(data) = store.get_mut(model).and_then(AbstractPart::submodel_mut) {
        data.submodels = children.clone();
    }
    for child in children {
        link_model(store, child, visited, diagnostics)?;
    }

    let parts = store
        .get(model)
        .map(|m| m.parts.clone())
        .unwrap_or_default();
    for id in &parts {
        if let Some(target) = store.instance(*id).and_then(|part| part.abstract_part) {
            mark_used(store, target);
        }
    }
    place_parts(store, model, &name, &parts, diagnostics)?;
    link_callouts(store, model, &parts);
    Ok(())
}

/// Add each placed part to the CSI of the step it names.
fn place_parts(
    store: &mut PartStore,
    model: AbstractPartId,
    name: &str,
    parts: &[PartInstanceId],
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let (models, instances) = store.split_mut();
    let Some(data) = models.get_mut(model).and_then(AbstractPart::submodel_mut) else {
        return Ok(());
    };
    for id in parts {
        let Some(part) = instances.get(*id) else {
            continue;
        };
        if !part.is_placed() {
            continue;
        }
        let (page, step) = (part.page_number, part.step_number);
        match data.page_mut(page).and_then(|p| p.step_mut(step)) {
            Some(target) => target.csi.parts.push(*id),
            None => diagnostics.report(
                DiagnosticKind::UnplacedPart,
                format!(
                    "part '{}' of '{name}' is placed on page {page} step {step}, which does not exist",
                    part.filename
                ),
            )?,
        }
    }
    Ok(())
}

/// Pair each part flagged as shown in a callout with the first matching
/// copy in each of its step's callouts. The original keeps the copy from
/// the last callout that shows it.
fn link_callouts(store: &mut PartStore, model: AbstractPartId, parts: &[PartInstanceId]) {
    let mut links = Vec::new();
    if let Some(data) = store.get(model).and_then(AbstractPart::submodel) {
        for id in parts {
            let Some(part) = store.instance(*id).filter(|p| p.in_callout) else {
                continue;
            };
            let Some(step) = data
                .page(part.page_number)
                .and_then(|page| page.step(part.step_number))
            else {
                continue;
            };
            // First match within each callout; every callout showing the
            // part gets its copy linked.
            for callout in &step.callouts {
                let copy = callout
                    .part_ids()
                    .find(|c| store.instance(*c).is_some_and(|copy| copy.matches(part)));
                if let Some(copy) = copy {
                    links.push((*id, copy));
                }
            }
        }
    }
    for (original, copy) in links {
        if let Some(part) = store.instance_mut(original) {
            part.callout_part = Some(copy);
        }
        if let Some(part) = store.instance_mut(copy) {
            part.original_part = Some(original);
        }
    }
}

fn reconcile_model_plis(
    store: &mut PartStore,
    model: AbstractPartId,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let (models, instances) = store.split_mut();
    let Some(model) = models.get_mut(model) else {
        return Ok(());
    };
    let name = model.filename.clone();
    let Some(data) = model.submodel_mut() else {
        return Ok(());
    };
    for page in &mut data.pages {
        let page_number = page.number;
        for step in &mut page.steps {
            reconcile_step(step, instances, &name, page_number, diagnostics)?;
        }
    }
    Ok(())
}

/// Bind a step's PLI items to the step's own PLI parts. Stored quantities
/// that disagree with the parts are replaced by the actual count.
fn reconcile_step(
    step: &mut Step,
    instances: &Arena<Part, PartInstanceId>,
    model: &str,
    page: i32,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    if let Some(pli) = step.pli.as_mut() {
        let mut groups: Vec<((String, i32), Vec<PartInstanceId>)> = Vec::new();
        for id in &step.csi.parts {
            let Some(part) = instances.get(*id).filter(|p| p.is_in_pli) else {
                continue;
            };
            let key = (part.filename.clone(), color_code(part.color.as_ref()));
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, ids)) => ids.push(*id),
                None => groups.push((key, vec![*id])),
            }
        }

        for item in &mut pli.items {
            let code = item.color_code();
            let parts = groups
                .iter()
                .position(|((filename, c), _)| *filename == item.filename && *c == code)
                .map(|index| groups.remove(index).1)
                .unwrap_or_default();
            let actual = parts.len() as i32;
            if item.quantity != actual {
                diagnostics.report(
                    DiagnosticKind::CountMismatch,
                    format!(
                        "'{model}' page {page} step {}: PLI item '{}' colour {code} says {} but the step has {actual}",
                        step.number, item.filename, item.quantity
                    ),
                )?;
            }
            item.quantity = actual;
            item.parts = parts;
        }

        for ((filename, code), ids) in groups {
            diagnostics.report(
                DiagnosticKind::CountMismatch,
                format!(
                    "'{model}' page {page} step {}: {} '{filename}' in colour {code} missing from the PLI",
                    step.number,
                    ids.len()
                ),
            )?;
            for id in ids {
                if let Some(part) = instances.get(id) {
                    pli.add_part(id, &filename, part.color.as_ref(), part.abstract_part);
                }
            }
        }
    }

    for callout in &mut step.callouts {
        for inner in &mut callout.steps {
            reconcile_step(inner, instances, model, page, diagnostics)?;
        }
    }
    Ok(())
}

fn dictionary_index(store: &PartStore) -> HashMap<String, AbstractPartId> {
    store
        .entries()
        .map(|(id, part)| (part.filename.clone(), id))
        .collect()
}

fn bind_pli_items(
    pli: &mut Pli,
    index: &HashMap<String, AbstractPartId>,
    missing: &mut BTreeMap<String, usize>,
) {
    for item in &mut pli.items {
        bind_pli_item(item, index, missing);
    }
}

fn bind_pli_item(
    item: &mut PliItem,
    index: &HashMap<String, AbstractPartId>,
    missing: &mut BTreeMap<String, usize>,
) {
    match index.get(&item.filename) {
        Some(id) => item.abstract_part = Some(*id),
        None => *missing.entry(item.filename.clone()).or_default() += 1,
    }
}

fn report_missing_pli_items(
    missing: BTreeMap<String, usize>,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    for (filename, count) in missing {
        diagnostics.report(
            DiagnosticKind::UnresolvedReference,
            format!("no dictionary entry for PLI item '{filename}' ({count} items)"),
        )?;
    }
    Ok(())
}

/// Point every PLI item, wherever it is shown, at its dictionary entry.
fn resolve_pli_items(doc: &mut Document, diagnostics: &mut Diagnostics) -> Result<()> {
    let index = dictionary_index(&doc.store);
    let mut missing = BTreeMap::new();

    let (models, _) = doc.store.split_mut();
    for (_, model) in models.iter_mut() {
        if let Some(data) = model.submodel_mut() {
            for page in &mut data.pages {
                page.visit_plis_mut(&mut |pli| bind_pli_items(pli, &index, &mut missing));
            }
        }
    }
    if let Some(pli) = doc
        .title_page
        .as_mut()
        .and_then(|page| page.submodel_item.as_mut())
        .and_then(|preview| preview.pli.as_mut())
    {
        bind_pli_items(pli, &index, &mut missing);
    }
    for page in &mut doc.part_list_pages {
        bind_pli_items(&mut page.pli, &index, &mut missing);
    }
    report_missing_pli_items(missing, diagnostics)
}

/// Resolve each submodel's parent name: empty names the instructions
/// root, the instructions filename names the main model.
fn resolve_parents(doc: &mut Document, diagnostics: &mut Diagnostics) -> Result<()> {
    let submodels: Vec<(AbstractPartId, String, String)> = doc
        .store
        .submodels()
        .filter_map(|(id, part)| {
            part.submodel()
                .map(|data| (id, part.filename.clone(), data.parent_name.clone()))
        })
        .collect();

    for (id, filename, parent_name) in submodels {
        let parent = if parent_name.is_empty() {
            ParentRef::Instructions
        } else if parent_name == doc.filename {
            ParentRef::MainModel
        } else if let Some(parent) = doc.store.lookup(&parent_name) {
            ParentRef::Submodel(parent)
        } else {
            diagnostics.report(
                DiagnosticKind::UnresolvedReference,
                format!("submodel '{filename}' names parent '{parent_name}', which is not in the dictionary"),
            )?;
            ParentRef::Dangling
        };
        if let Some(data) = doc.store.get_mut(id).and_then(AbstractPart::submodel_mut) {
            data.parent = parent;
        }
    }
    if let Some(data) = doc
        .store
        .get_mut(doc.main_model)
        .and_then(AbstractPart::submodel_mut)
    {
        data.parent = ParentRef::Instructions;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lic_model::geometry::translation;
    use lic_model::{IDENTITY_MATRIX, LicColor, Page};

    fn red() -> Option<LicColor> {
        lic_model::ColorTable::ldraw().get(4).cloned()
    }

    /// A document as the reader leaves it: instances with filenames only,
    /// not yet in any CSI.
    fn unlinked(parts: Vec<Part>) -> Document {
        let mut doc = Document::new("house.ldr");
        doc.store.insert(AbstractPart::new("3001.dat", "Brick 2 x 4"));
        let ids: Vec<PartInstanceId> = parts.into_iter().map(|p| doc.store.add_instance(p)).collect();
        let main = doc.main_model;
        let (models, _) = doc.store.split_mut();
        let model = models.get_mut(main).unwrap();
        model.parts = ids;
        let data = model.submodel_mut().unwrap();
        let mut page = Page::new(1, 0);
        page.steps.push(Step::new(1));
        data.pages.push(page);
        doc
    }

    fn placed(filename: &str, page: i32, step: i32) -> Part {
        let mut part = Part::new(filename, red(), IDENTITY_MATRIX);
        part.page_number = page;
        part.step_number = step;
        part
    }

    #[test]
    fn test_parts_join_their_step_csi() {
        let mut doc = unlinked(vec![placed("3001.dat", 1, 1), placed("3001.dat", 1, 1)]);
        let mut diagnostics = Diagnostics::new(false);
        link_document(&mut doc, &mut diagnostics).unwrap();

        let step = doc.step(doc.main_model, 1, 1).unwrap();
        assert_eq!(step.csi.parts.len(), 2);
        let pli = step.pli.as_ref().unwrap();
        assert_eq!(pli.items.len(), 1);
        assert_eq!(pli.items[0].quantity, 2);
        // the step's PLI was empty on disk
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_missing_filename_reported_once() {
        let mut doc = unlinked(vec![placed("missing.dat", 1, 1), placed("missing.dat", 1, 1)]);
        if let Ok(step) = doc.step_mut(doc.main_model, 1, 1) {
            step.pli = None;
        }
        let mut diagnostics = Diagnostics::new(false);
        link_document(&mut doc, &mut diagnostics).unwrap();
        let items = diagnostics.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, DiagnosticKind::UnresolvedReference);
        assert!(items[0].message.contains("2 placements"));
    }

    #[test]
    fn test_missing_filename_fails_strict() {
        let mut doc = unlinked(vec![placed("missing.dat", 1, 1)]);
        let mut diagnostics = Diagnostics::new(true);
        assert!(link_document(&mut doc, &mut diagnostics).is_err());
    }

    #[test]
    fn test_unknown_step_is_unplaced() {
        let mut doc = unlinked(vec![placed("3001.dat", 1, 7), placed("3001.dat", -1, -1)]);
        let mut diagnostics = Diagnostics::new(false);
        link_document(&mut doc, &mut diagnostics).unwrap();
        let items = diagnostics.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, DiagnosticKind::UnplacedPart);
    }

    #[test]
    fn test_callout_copy_is_linked_first_match() {
        let mut original = placed("3001.dat", 1, 1);
        original.in_callout = true;
        original.matrix = translation(0.0, -24.0, 0.0);
        let mut doc = unlinked(vec![original.clone()]);

        let mut copy = original.clone();
        copy.in_callout = false;
        copy.step_number = 1;
        let first = doc.store.add_instance(copy.clone());
        let second = doc.store.add_instance(copy);
        let step = doc.step_mut(doc.main_model, 1, 1).unwrap();
        let mut callout = lic_model::Callout::new(1);
        let mut inner = Step::new(1);
        inner.csi.parts = vec![first, second];
        callout.steps.push(inner);
        step.callouts.push(callout);

        let mut diagnostics = Diagnostics::new(false);
        link_document(&mut doc, &mut diagnostics).unwrap();

        let original_id = doc.main_model().unwrap().parts[0];
        let linked = doc.store.instance(original_id).unwrap();
        assert_eq!(linked.callout_part, Some(first));
        assert_eq!(doc.store.instance(first).unwrap().original_part, Some(original_id));
        assert_eq!(doc.store.instance(second).unwrap().original_part, None);
    }

    #[test]
    fn test_parent_resolution() {
        let mut doc = Document::new("house.ldr");
        let mut roof = AbstractPart::new_submodel("roof.ldr", "Roof");
        roof.submodel_mut().unwrap().parent_name = "house.ldr".to_string();
        let mut chimney = AbstractPart::new_submodel("chimney.ldr", "Chimney");
        chimney.submodel_mut().unwrap().parent_name = "roof.ldr".to_string();
        let mut stray = AbstractPart::new_submodel("stray.ldr", "Stray");
        stray.submodel_mut().unwrap().parent_name = "gone.ldr".to_string();
        let (roof, _) = doc.store.insert(roof);
        let (chimney, _) = doc.store.insert(chimney);
        let (stray, _) = doc.store.insert(stray);

        let mut diagnostics = Diagnostics::new(false);
        resolve_parents(&mut doc, &mut diagnostics).unwrap();
        let parent = |id| doc.store.get(id).unwrap().submodel().unwrap().parent;
        assert_eq!(parent(roof), ParentRef::MainModel);
        assert_eq!(parent(chimney), ParentRef::Submodel(roof));
        assert_eq!(parent(stray), ParentRef::Dangling);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_submodel_listed_twice_is_reported() {
        let mut doc = Document::new("house.ldr");
        let (wall, _) = doc.store.insert(AbstractPart::new_submodel("wall.ldr", "Wall"));
        let mut left = AbstractPart::new_submodel("left.ldr", "Left");
        left.submodel_mut().unwrap().submodel_names.push("wall.ldr".to_string());
        let mut right = AbstractPart::new_submodel("right.ldr", "Right");
        right.submodel_mut().unwrap().submodel_names.push("wall.ldr".to_string());
        doc.store.insert(left);
        doc.store.insert(right);
        let main = doc.main_model;
        doc.store.get_mut(main).unwrap().submodel_mut().unwrap().submodel_names =
            vec!["left.ldr".to_string(), "right.ldr".to_string()];

        let mut diagnostics = Diagnostics::new(false);
        link_document(&mut doc, &mut diagnostics).unwrap();
        let items = diagnostics.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, DiagnosticKind::SubmodelTree);
        assert!(doc.store.get(wall).unwrap().submodel().unwrap().used);
    }
}
