//! The instruction book root and the builder used to assemble one.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::arena::{AbstractPartId, Arena, PartInstanceId};
use crate::color::ColorTable;
use crate::error::{ModelError, Result};
use crate::page::{Guide, Page, PartListPage, TitlePage};
use crate::part::{AbstractPart, ParentRef, Part, SubmodelData};
use crate::render::{DisplayItem, Renderer, measure_with_ladder};
use crate::step::{Callout, Pli, Step};
use crate::store::PartStore;
use crate::template::{StaticInfo, Template};

/// A complete instruction book.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    /// Format version the document was read from, if it came from a file.
    pub loaded_version: Option<i16>,
    pub static_info: StaticInfo,
    pub template: Option<Template>,
    pub store: PartStore,
    /// The root submodel; stored outside the dictionary.
    pub main_model: AbstractPartId,
    pub title_page: Option<TitlePage>,
    pub part_list_pages: Vec<PartListPage>,
    pub guides: Vec<Guide>,
    pub colors: ColorTable,
}

/// Counts describing a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub filename: String,
    pub version: Option<i16>,
    pub parts: usize,
    pub submodels: usize,
    pub pages: usize,
    pub steps: usize,
    pub callouts: usize,
    pub part_instances: usize,
    pub pli_items: usize,
    pub title_page: bool,
    pub part_list_pages: usize,
    pub guides: usize,
}

/// Address of a step inside a submodel's pages, descending through
/// callouts as `(callout index, step index)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StepPath {
    page: usize,
    step: usize,
    nested: Vec<(usize, usize)>,
}

enum Child {
    Page(usize),
    Submodel(AbstractPartId),
}

impl Document {
    /// An empty document whose main model is named after `filename`.
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let mut store = PartStore::new();
        let mut main = AbstractPart::new_submodel(filename.clone(), filename.clone());
        if let Some(data) = main.submodel_mut() {
            data.is_main = true;
            data.used = true;
            data.parent = ParentRef::Instructions;
        }
        let main_model = store.insert_unindexed(main);
        Self {
            filename,
            loaded_version: None,
            static_info: StaticInfo::default(),
            template: None,
            store,
            main_model,
            title_page: None,
            part_list_pages: Vec::new(),
            guides: Vec::new(),
            colors: ColorTable::ldraw(),
        }
    }

    #[must_use]
    pub fn main_model(&self) -> Option<&AbstractPart> {
        self.store.get(self.main_model)
    }

    /// The main model followed by every dictionary submodel.
    #[must_use]
    pub fn model_ids(&self) -> Vec<AbstractPartId> {
        std::iter::once(self.main_model)
            .chain(self.store.submodels().map(|(id, _)| id))
            .collect()
    }

    pub fn submodel(&self, model: AbstractPartId) -> Result<&SubmodelData> {
        let part = self.store.get(model).ok_or(ModelError::UnknownModel(model))?;
        part.submodel()
            .ok_or_else(|| ModelError::NotASubmodel(part.filename.clone()))
    }

    pub fn step(&self, model: AbstractPartId, page: i32, step: i32) -> Result<&Step> {
        let part = self.store.get(model).ok_or(ModelError::UnknownModel(model))?;
        let data = part
            .submodel()
            .ok_or_else(|| ModelError::NotASubmodel(part.filename.clone()))?;
        let page_ref = data.page(page).ok_or_else(|| ModelError::UnknownPage {
            model: part.filename.clone(),
            page,
        })?;
        page_ref.step(step).ok_or(ModelError::UnknownStep { page, step })
    }

    pub fn step_mut(&mut self, model: AbstractPartId, page: i32, step: i32) -> Result<&mut Step> {
        let (parts, _) = self.store.split_mut();
        locate_step(parts, model, page, step)
    }

    /// Add a plain part to the dictionary.
    pub fn add_abstract_part(&mut self, part: AbstractPart) -> AbstractPartId {
        let (id, replaced) = self.store.insert(part);
        if replaced {
            debug!(%id, "replaced dictionary entry");
        }
        id
    }

    /// Create a submodel under `parent` and register it in the dictionary.
    pub fn add_submodel(
        &mut self,
        filename: impl Into<String>,
        name: impl Into<String>,
        parent: AbstractPartId,
    ) -> Result<AbstractPartId> {
        let filename = filename.into();
        let parent_part = self.store.get(parent).ok_or(ModelError::UnknownModel(parent))?;
        let (parent_name, parent_ref) = if parent_part.is_main_model() {
            (self.filename.clone(), ParentRef::MainModel)
        } else if parent_part.is_submodel() {
            (parent_part.filename.clone(), ParentRef::Submodel(parent))
        } else {
            return Err(ModelError::NotASubmodel(parent_part.filename.clone()));
        };
        let row = self.next_row(parent)?;

        let mut submodel = AbstractPart::new_submodel(filename.clone(), name);
        if let Some(data) = submodel.submodel_mut() {
            data.row = row;
            data.parent_name = parent_name;
            data.parent = parent_ref;
            data.used = true;
        }
        let id = self.add_abstract_part(submodel);

        let (parts, _) = self.store.split_mut();
        let data = locate_submodel(parts, parent)?;
        data.submodel_names.push(filename);
        data.submodels.push(id);
        Ok(id)
    }

    /// Append a page to `model`.
    pub fn add_page(&mut self, model: AbstractPartId, number: i32) -> Result<()> {
        let row = self.next_row(model)?;
        let (parts, _) = self.store.split_mut();
        locate_submodel(parts, model)?.pages.push(Page::new(number, row));
        Ok(())
    }

    /// Append a step to a page of `model`.
    pub fn add_step(&mut self, model: AbstractPartId, page: i32, number: i32) -> Result<()> {
        let (parts, _) = self.store.split_mut();
        locate_page(parts, model, page)?.steps.push(Step::new(number));
        Ok(())
    }

    /// Place `part` in a step of `model`: the part joins the model's part
    /// list, the step's CSI and, when it is a PLI part, the step's PLI.
    pub fn add_part(
        &mut self,
        model: AbstractPartId,
        page: i32,
        step: i32,
        mut part: Part,
    ) -> Result<PartInstanceId> {
        self.step(model, page, step)?;
        part.page_number = page;
        part.step_number = step;
        part.abstract_part = self.store.lookup(&part.filename);
        if let Some(target) = part
            .abstract_part
            .and_then(|id| self.store.get_mut(id))
            .and_then(AbstractPart::submodel_mut)
        {
            target.used = true;
        }
        let pli_key = part
            .is_in_pli
            .then(|| (part.filename.clone(), part.color.clone(), part.abstract_part));
        let id = self.store.add_instance(part);

        let (parts, _) = self.store.split_mut();
        if let Some(owner) = parts.get_mut(model) {
            owner.parts.push(id);
        }
        let target = locate_step(parts, model, page, step)?;
        target.csi.parts.push(id);
        target.csi.dirty = true;
        if let Some((filename, color, abstract_part)) = pli_key {
            target
                .pli
                .get_or_insert_with(Pli::default)
                .add_part(id, &filename, color.as_ref(), abstract_part);
        }
        Ok(id)
    }

    /// Attach a new callout to a step; returns its index.
    pub fn add_callout(&mut self, model: AbstractPartId, page: i32, step: i32) -> Result<usize> {
        let target = self.step_mut(model, page, step)?;
        let index = target.callouts.len();
        target.callouts.push(Callout::new(index as i32 + 1));
        Ok(index)
    }

    /// Append a step to a callout; returns the new callout step number.
    pub fn add_callout_step(
        &mut self,
        model: AbstractPartId,
        page: i32,
        step: i32,
        callout: usize,
    ) -> Result<i32> {
        let target = self.step_mut(model, page, step)?;
        let callout_ref = target
            .callouts
            .get_mut(callout)
            .ok_or(ModelError::UnknownCallout { step, index: callout })?;
        let number = callout_ref.steps.len() as i32 + 1;
        callout_ref.steps.push(Step {
            pli: None,
            ..Step::new(number)
        });
        Ok(number)
    }

    /// Duplicate `original` into a callout step and link the two parts.
    pub fn copy_part_to_callout(
        &mut self,
        model: AbstractPartId,
        page: i32,
        step: i32,
        callout: usize,
        callout_step: i32,
        original: PartInstanceId,
    ) -> Result<PartInstanceId> {
        let mut copy = self
            .store
            .instance(original)
            .cloned()
            .ok_or(ModelError::UnknownPart(original))?;
        copy.in_callout = false;
        copy.callout_part = None;
        copy.original_part = Some(original);
        copy.page_number = page;
        copy.step_number = callout_step;
        self.callout_step_mut(model, page, step, callout, callout_step)?;

        let id = self.store.add_instance(copy);
        let inner = self.callout_step_mut(model, page, step, callout, callout_step)?;
        inner.csi.parts.push(id);
        inner.csi.dirty = true;
        if let Some(source) = self.store.instance_mut(original) {
            source.in_callout = true;
            source.callout_part = Some(id);
        }
        Ok(id)
    }

    fn callout_step_mut(
        &mut self,
        model: AbstractPartId,
        page: i32,
        step: i32,
        callout: usize,
        callout_step: i32,
    ) -> Result<&mut Step> {
        self.step_mut(model, page, step)?
            .callouts
            .get_mut(callout)
            .ok_or(ModelError::UnknownCallout { step, index: callout })?
            .step_mut(callout_step)
            .ok_or(ModelError::UnknownStep {
                page,
                step: callout_step,
            })
    }

    /// Insert an empty page into `model` at `position` (an index into the
    /// model's pages) and renumber. Returns the new page's number.
    pub fn insert_page(&mut self, model: AbstractPartId, position: usize) -> Result<i32> {
        let data = self.submodel(model)?;
        let position = position.min(data.pages.len());
        let row = match data.pages.get(position) {
            Some(page) => page.row,
            None => self.next_row(model)?,
        };
        self.shift_rows(model, row, 1)?;
        let (parts, _) = self.store.split_mut();
        locate_submodel(parts, model)?
            .pages
            .insert(position, Page::new(0, row));
        self.renumber();
        Ok(self.submodel(model)?.pages[position].number)
    }

    /// Remove an empty page from `model` and renumber.
    pub fn remove_page(&mut self, model: AbstractPartId, number: i32) -> Result<()> {
        let data = self.submodel(model)?;
        let Some(index) = data.pages.iter().position(|p| p.number == number) else {
            return Err(ModelError::UnknownPage {
                model: self.store.get(model).map(|p| p.filename.clone()).unwrap_or_default(),
                page: number,
            });
        };
        if !data.pages[index].is_empty() {
            return Err(ModelError::PageNotEmpty(number));
        }
        let row = data.pages[index].row;
        let (parts, _) = self.store.split_mut();
        locate_submodel(parts, model)?.pages.remove(index);
        self.shift_rows(model, row + 1, -1)?;
        self.renumber();
        Ok(())
    }

    /// Give every page and step a dense number in reading order and move
    /// part placements along with them.
    ///
    /// Reading order walks each submodel's pages and child submodels by
    /// row, descending into a child submodel where it sits. Pages start at
    /// 2 when a title page exists; part-list pages follow the last page.
    /// Callout steps are numbered from 1 within their callout.
    pub fn renumber(&mut self) {
        let order = self.page_order();
        let mut page_number = if self.title_page.is_some() { 2 } else { 1 };
        let mut step_number = 1;
        let (parts, instances) = self.store.split_mut();
        for (model, index) in order {
            let Some(page) = parts
                .get_mut(model)
                .and_then(AbstractPart::submodel_mut)
                .and_then(|d| d.pages.get_mut(index))
            else {
                continue;
            };
            page.number = page_number;
            for step in &mut page.steps {
                step.number = step_number;
                place_parts(instances, &step.csi.parts, page_number, step_number);
                renumber_callouts(step, page_number, instances);
                step_number += 1;
            }
            page_number += 1;
        }
        for page in &mut self.part_list_pages {
            page.number = page_number;
            page_number += 1;
        }
    }

    /// Parts visible in the CSI of `step`: every part added in the same
    /// submodel up to and including that step.
    pub fn cumulative_parts(
        &self,
        model: AbstractPartId,
        page: i32,
        step: i32,
    ) -> Result<Vec<PartInstanceId>> {
        let data = self.submodel(model)?;
        let mut visible = Vec::new();
        for p in &data.pages {
            for s in &p.steps {
                visible.extend_from_slice(&s.csi.parts);
                if p.number == page && s.number == step {
                    return Ok(visible);
                }
            }
        }
        // Produce the precise error.
        self.step(model, page, step)?;
        Ok(visible)
    }

    #[must_use]
    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats {
            filename: self.filename.clone(),
            version: self.loaded_version,
            parts: self.store.plain_parts().count(),
            submodels: self.store.submodels().count(),
            pages: 0,
            steps: 0,
            callouts: 0,
            part_instances: self.store.instance_count(),
            pli_items: 0,
            title_page: self.title_page.is_some(),
            part_list_pages: self.part_list_pages.len(),
            guides: self.guides.len(),
        };
        for id in self.model_ids() {
            let Some(part) = self.store.get(id) else {
                continue;
            };
            for page in part.pages() {
                stats.pages += 1;
                for step in &page.steps {
                    count_step(step, &mut stats);
                }
            }
        }
        stats
    }

    /// Compile every abstract part bottom-up, then every CSI in lineage
    /// order, measuring each image. Returns the number of CSIs compiled.
    pub fn init_display_lists<R: Renderer>(&mut self, renderer: &mut R) -> usize {
        compile_parts(&mut self.store, renderer, true);
        self.model_ids()
            .into_iter()
            .map(|model| compile_lineages(&mut self.store, model, renderer, false))
            .sum()
    }

    /// Recompile parts without a display list and every CSI from the first
    /// dirty one onward in its lineage. Returns the number of CSIs compiled.
    pub fn refresh_dirty<R: Renderer>(&mut self, renderer: &mut R) -> usize {
        compile_parts(&mut self.store, renderer, false);
        self.model_ids()
            .into_iter()
            .map(|model| compile_lineages(&mut self.store, model, renderer, true))
            .sum()
    }

    /// True when some CSI needs rendering before the document is saved.
    #[must_use]
    pub fn has_dirty_csis(&self) -> bool {
        self.model_ids().into_iter().any(|model| {
            self.store
                .get(model)
                .is_some_and(|p| p.pages().iter().any(|page| page.steps.iter().any(step_is_dirty)))
        })
    }

    fn next_row(&self, model: AbstractPartId) -> Result<i32> {
        let data = self.submodel(model)?;
        let page_rows = data.pages.iter().map(|p| p.row);
        let submodel_rows = self
            .child_submodels(data)
            .into_iter()
            .filter_map(|id| self.store.get(id).and_then(AbstractPart::submodel))
            .map(|s| s.row);
        Ok(page_rows.chain(submodel_rows).max().map_or(0, |row| row + 1))
    }

    fn shift_rows(&mut self, model: AbstractPartId, from_row: i32, delta: i32) -> Result<()> {
        let children = self.child_submodels(self.submodel(model)?);
        let (parts, _) = self.store.split_mut();
        for page in &mut locate_submodel(parts, model)?.pages {
            if page.row >= from_row {
                page.row += delta;
            }
        }
        for child in children {
            if let Some(data) = parts.get_mut(child).and_then(AbstractPart::submodel_mut)
                && data.row >= from_row
            {
                data.row += delta;
            }
        }
        Ok(())
    }

    fn child_submodels(&self, data: &SubmodelData) -> Vec<AbstractPartId> {
        if data.submodels.is_empty() {
            data.submodel_names
                .iter()
                .filter_map(|name| self.store.lookup(name))
                .collect()
        } else {
            data.submodels.clone()
        }
    }

    fn page_order(&self) -> Vec<(AbstractPartId, usize)> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        self.collect_pages(self.main_model, &mut order, &mut visited);
        order
    }

    fn collect_pages(
        &self,
        model: AbstractPartId,
        order: &mut Vec<(AbstractPartId, usize)>,
        visited: &mut HashSet<AbstractPartId>,
    ) {
        if !visited.insert(model) {
            return;
        }
        let Some(data) = self.store.get(model).and_then(AbstractPart::submodel) else {
            return;
        };
        // Submodels sort before pages sharing a row.
        let mut children: Vec<(i32, u8, Child)> = data
            .pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.row, 1, Child::Page(i)))
            .collect();
        for id in self.child_submodels(data) {
            if let Some(child) = self.store.get(id).and_then(AbstractPart::submodel) {
                children.push((child.row, 0, Child::Submodel(id)));
            }
        }
        children.sort_by_key(|(row, kind, _)| (*row, *kind));
        for (_, _, child) in children {
            match child {
                Child::Page(index) => order.push((model, index)),
                Child::Submodel(id) => self.collect_pages(id, order, visited),
            }
        }
    }
}

fn locate_submodel(
    parts: &mut Arena<AbstractPart, AbstractPartId>,
    model: AbstractPartId,
) -> Result<&mut SubmodelData> {
    let part = parts.get_mut(model).ok_or(ModelError::UnknownModel(model))?;
    let AbstractPart {
        filename, submodel, ..
    } = part;
    submodel
        .as_deref_mut()
        .ok_or_else(|| ModelError::NotASubmodel(filename.clone()))
}

fn locate_page(
    parts: &mut Arena<AbstractPart, AbstractPartId>,
    model: AbstractPartId,
    page: i32,
) -> Result<&mut Page> {
    let part = parts.get_mut(model).ok_or(ModelError::UnknownModel(model))?;
    let AbstractPart {
        filename, submodel, ..
    } = part;
    let data = submodel
        .as_deref_mut()
        .ok_or_else(|| ModelError::NotASubmodel(filename.clone()))?;
    data.page_mut(page).ok_or_else(|| ModelError::UnknownPage {
        model: filename.clone(),
        page,
    })
}

fn locate_step(
    parts: &mut Arena<AbstractPart, AbstractPartId>,
    model: AbstractPartId,
    page: i32,
    step: i32,
) -> Result<&mut Step> {
    locate_page(parts, model, page)?
        .step_mut(step)
        .ok_or(ModelError::UnknownStep { page, step })
}

fn place_parts(
    instances: &mut Arena<Part, PartInstanceId>,
    ids: &[PartInstanceId],
    page: i32,
    step: i32,
) {
    for id in ids {
        if let Some(part) = instances.get_mut(*id) {
            part.page_number = page;
            part.step_number = step;
        }
    }
}

fn renumber_callouts(step: &mut Step, page: i32, instances: &mut Arena<Part, PartInstanceId>) {
    for (index, callout) in step.callouts.iter_mut().enumerate() {
        callout.number = index as i32 + 1;
        for (inner_index, inner) in callout.steps.iter_mut().enumerate() {
            inner.number = inner_index as i32 + 1;
            place_parts(instances, &inner.csi.parts, page, inner.number);
            renumber_callouts(inner, page, instances);
        }
    }
}

fn count_step(step: &Step, stats: &mut DocumentStats) {
    stats.steps += 1;
    stats.pli_items += step.pli.as_ref().map_or(0, |p| p.items.len());
    for callout in &step.callouts {
        stats.callouts += 1;
        for inner in &callout.steps {
            count_step(inner, stats);
        }
    }
}

fn step_is_dirty(step: &Step) -> bool {
    step.csi.dirty
        || step
            .callouts
            .iter()
            .any(|c| c.steps.iter().any(step_is_dirty))
}

fn display_items(store: &PartStore, ids: &[PartInstanceId]) -> Vec<DisplayItem> {
    ids.iter()
        .filter_map(|id| store.instance(*id))
        .filter_map(|part| {
            let list = store.get(part.abstract_part?)?.display_list?;
            Some(DisplayItem {
                list,
                matrix: part.matrix,
                color: part.color.clone(),
                invert: part.invert,
            })
        })
        .collect()
}

/// Abstract parts ordered so every part follows the parts it contains.
fn bottom_up_order(store: &PartStore) -> Vec<AbstractPartId> {
    fn visit(
        store: &PartStore,
        id: AbstractPartId,
        seen: &mut HashSet<AbstractPartId>,
        order: &mut Vec<AbstractPartId>,
    ) {
        if !seen.insert(id) {
            return;
        }
        if let Some(part) = store.get(id) {
            let children = part
                .parts
                .iter()
                .filter_map(|p| store.instance(*p))
                .filter_map(|p| p.abstract_part);
            for child in children {
                visit(store, child, seen, order);
            }
        }
        order.push(id);
    }

    let mut order = Vec::new();
    let mut seen = HashSet::new();
    for (id, _) in store.abstract_parts() {
        visit(store, id, &mut seen, &mut order);
    }
    order
}

fn compile_parts<R: Renderer>(store: &mut PartStore, renderer: &mut R, recompile: bool) {
    for id in bottom_up_order(store) {
        let Some(part) = store.get(id) else {
            continue;
        };
        if !recompile && part.display_list.is_some() {
            continue;
        }
        let items = display_items(store, &part.parts);
        let list = renderer.compile_part(&part.primitives, &items);
        let measured = if part.is_primitive {
            None
        } else {
            measure_with_ladder(renderer, list)
        };
        if let Some(part) = store.get_mut(id) {
            part.display_list = Some(list);
            if let Some(dims) = measured {
                part.dimensions = dims;
            }
        }
    }
}

fn step_lineages(pages: &[Page]) -> Vec<Vec<StepPath>> {
    fn callout_lineages(step: &Step, path: &StepPath, out: &mut Vec<Vec<StepPath>>) {
        for (ci, callout) in step.callouts.iter().enumerate() {
            let mut lineage = Vec::new();
            for (si, inner) in callout.steps.iter().enumerate() {
                let mut inner_path = path.clone();
                inner_path.nested.push((ci, si));
                callout_lineages(inner, &inner_path, out);
                lineage.push(inner_path);
            }
            out.push(lineage);
        }
    }

    let mut main = Vec::new();
    let mut nested = Vec::new();
    for (pi, page) in pages.iter().enumerate() {
        for (si, step) in page.steps.iter().enumerate() {
            let path = StepPath {
                page: pi,
                step: si,
                nested: Vec::new(),
            };
            callout_lineages(step, &path, &mut nested);
            main.push(path);
        }
    }
    let mut lineages = vec![main];
    lineages.extend(nested);
    lineages
}

fn step_at<'a>(pages: &'a [Page], path: &StepPath) -> Option<&'a Step> {
    let mut step = pages.get(path.page)?.steps.get(path.step)?;
    for &(callout, inner) in &path.nested {
        step = step.callouts.get(callout)?.steps.get(inner)?;
    }
    Some(step)
}

fn step_at_mut<'a>(pages: &'a mut [Page], path: &StepPath) -> Option<&'a mut Step> {
    let mut step = pages.get_mut(path.page)?.steps.get_mut(path.step)?;
    for &(callout, inner) in &path.nested {
        step = step.callouts.get_mut(callout)?.steps.get_mut(inner)?;
    }
    Some(step)
}

fn compile_lineages<R: Renderer>(
    store: &mut PartStore,
    model: AbstractPartId,
    renderer: &mut R,
    only_dirty: bool,
) -> usize {
    let lineages = match store.get(model) {
        Some(part) => step_lineages(part.pages()),
        None => return 0,
    };
    let mut compiled = 0;
    for lineage in lineages {
        let mut previous = None;
        let mut stale = !only_dirty;
        for path in lineage {
            let Some(step) = store.get(model).and_then(|p| step_at(p.pages(), &path)) else {
                continue;
            };
            stale |= step.csi.dirty || step.csi.display_list.is_none();
            if !stale {
                previous = step.csi.display_list;
                continue;
            }
            let items = display_items(store, &step.csi.parts);
            let list = renderer.compile_csi(previous, &items);
            let measured = measure_with_ladder(renderer, list);
            if let Some(step) = store
                .get_mut(model)
                .and_then(AbstractPart::submodel_mut)
                .and_then(|d| step_at_mut(&mut d.pages, &path))
            {
                step.csi.display_list = Some(list);
                step.csi.dirty = false;
                if let Some(dims) = measured {
                    step.csi.apply(&dims);
                }
            }
            previous = Some(list);
            compiled += 1;
        }
    }
    compiled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{IDENTITY_MATRIX, translation};
    use crate::render::testing::MockRenderer;

    fn brick(doc: &Document, code: i32) -> Part {
        Part::new("3001.dat", doc.colors.get(code).cloned(), IDENTITY_MATRIX)
    }

    fn two_step_document() -> (Document, AbstractPartId) {
        let mut doc = Document::new("house.ldr");
        doc.add_abstract_part(AbstractPart::new("3001.dat", "Brick 2 x 4"));
        let main = doc.main_model;
        doc.add_page(main, 1).unwrap();
        doc.add_step(main, 1, 1).unwrap();
        doc.add_step(main, 1, 2).unwrap();
        (doc, main)
    }

    #[test]
    fn test_add_part_groups_pli() {
        let (mut doc, main) = two_step_document();
        for code in [4, 4, 1] {
            let part = brick(&doc, code);
            doc.add_part(main, 1, 1, part).unwrap();
        }
        let step = doc.step(main, 1, 1).unwrap();
        assert_eq!(step.csi.parts.len(), 3);
        let pli = step.pli.as_ref().unwrap();
        assert_eq!(pli.items.len(), 2);
        assert_eq!(pli.items[0].quantity, 2);
        assert_eq!(pli.items[1].quantity, 1);
        assert!(pli.items[0].abstract_part.is_some());
    }

    #[test]
    fn test_add_part_to_missing_step_leaves_store_untouched() {
        let (mut doc, main) = two_step_document();
        let part = brick(&doc, 4);
        let err = doc.add_part(main, 1, 9, part).unwrap_err();
        assert_eq!(err, ModelError::UnknownStep { page: 1, step: 9 });
        assert_eq!(doc.store.instance_count(), 0);
    }

    #[test]
    fn test_cumulative_parts_never_shrink() {
        let (mut doc, main) = two_step_document();
        let a = doc.add_part(main, 1, 1, brick(&doc, 4)).unwrap();
        let b = doc.add_part(main, 1, 2, brick(&doc, 1)).unwrap();
        assert_eq!(doc.cumulative_parts(main, 1, 1).unwrap(), vec![a]);
        assert_eq!(doc.cumulative_parts(main, 1, 2).unwrap(), vec![a, b]);
        assert!(doc.cumulative_parts(main, 1, 3).is_err());
    }

    #[test]
    fn test_callout_copy_links_both_ways() {
        let (mut doc, main) = two_step_document();
        let original = doc.add_part(main, 1, 1, brick(&doc, 4)).unwrap();
        let callout = doc.add_callout(main, 1, 1).unwrap();
        let inner = doc.add_callout_step(main, 1, 1, callout).unwrap();
        let copy = doc
            .copy_part_to_callout(main, 1, 1, callout, inner, original)
            .unwrap();

        let source = doc.store.instance(original).unwrap();
        assert!(source.in_callout);
        assert_eq!(source.callout_part, Some(copy));
        assert_eq!(doc.store.instance(copy).unwrap().original_part, Some(original));
        let step = doc.step(main, 1, 1).unwrap();
        assert_eq!(step.callout_parts().collect::<Vec<_>>(), vec![copy]);
    }

    #[test]
    fn test_submodel_pages_are_numbered_before_parent_pages() {
        let mut doc = Document::new("car.ldr");
        let main = doc.main_model;
        doc.add_page(main, 0).unwrap();
        let wheel = doc.add_submodel("wheel.ldr", "Wheel", main).unwrap();
        doc.add_page(wheel, 0).unwrap();
        doc.add_page(main, 0).unwrap();
        doc.add_step(main, 0, 0).unwrap();

        doc.renumber();
        let main_pages: Vec<i32> = doc.submodel(main).unwrap().pages.iter().map(|p| p.number).collect();
        let wheel_pages: Vec<i32> = doc.submodel(wheel).unwrap().pages.iter().map(|p| p.number).collect();
        assert_eq!(main_pages, vec![1, 3]);
        assert_eq!(wheel_pages, vec![2]);
        let data = doc.submodel(wheel).unwrap();
        assert_eq!(data.parent, ParentRef::MainModel);
        assert_eq!(data.parent_name, "car.ldr");
    }

    #[test]
    fn test_renumber_moves_part_placements() {
        let (mut doc, main) = two_step_document();
        let id = doc.add_part(main, 1, 2, brick(&doc, 4)).unwrap();
        doc.title_page = Some(TitlePage::default());
        doc.renumber();
        let part = doc.store.instance(id).unwrap();
        assert_eq!((part.page_number, part.step_number), (2, 2));
    }

    #[test]
    fn test_insert_and_remove_page() {
        let (mut doc, main) = two_step_document();
        doc.add_part(main, 1, 2, brick(&doc, 4)).unwrap();

        let number = doc.insert_page(main, 0).unwrap();
        assert_eq!(number, 1);
        let pages = &doc.submodel(main).unwrap().pages;
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].number, 2);
        assert_eq!(pages[1].steps[0].number, 1);

        assert_eq!(doc.remove_page(main, 2), Err(ModelError::PageNotEmpty(2)));
        doc.remove_page(main, 1).unwrap();
        let pages = &doc.submodel(main).unwrap().pages;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
    }

    #[test]
    fn test_init_display_lists_chains_csis() {
        let (mut doc, main) = two_step_document();
        doc.add_part(main, 1, 1, brick(&doc, 4)).unwrap();
        let mut moved = brick(&doc, 1);
        moved.matrix = translation(0.0, -24.0, 0.0);
        doc.add_part(main, 1, 2, moved).unwrap();

        let mut renderer = MockRenderer::fitting_at(256);
        let compiled = doc.init_display_lists(&mut renderer);
        assert_eq!(compiled, 2);
        assert_eq!(renderer.csi_calls.len(), 2);
        assert_eq!(renderer.csi_calls[0].0, None);
        assert!(renderer.csi_calls[1].0.is_some());
        assert_eq!(renderer.acquired.len(), renderer.released);
        assert!(!doc.has_dirty_csis());
        assert_eq!(doc.step(main, 1, 2).unwrap().csi.width, 40);
    }

    #[test]
    fn test_refresh_dirty_recompiles_tail_of_lineage() {
        let (mut doc, main) = two_step_document();
        doc.add_part(main, 1, 1, brick(&doc, 4)).unwrap();
        doc.add_part(main, 1, 2, brick(&doc, 1)).unwrap();
        let mut renderer = MockRenderer::fitting_at(128);
        doc.init_display_lists(&mut renderer);

        doc.step_mut(main, 1, 2).unwrap().csi.dirty = true;
        assert!(doc.has_dirty_csis());
        assert_eq!(doc.refresh_dirty(&mut renderer), 1);
        assert!(!doc.has_dirty_csis());
    }

    #[test]
    fn test_stats_serialize() {
        let (mut doc, main) = two_step_document();
        doc.add_part(main, 1, 1, brick(&doc, 4)).unwrap();
        let stats = doc.stats();
        assert_eq!(stats.pages, 1);
        assert_eq!(stats.steps, 2);
        assert_eq!(stats.part_instances, 1);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["parts"], 1);
        assert_eq!(json["filename"], "house.ldr");
    }
}
