//! Document-wide default styling, persisted separately as a `.lit` file.

use crate::arena::AbstractPartId;
use crate::geometry::Size;
use crate::page::Page;
use crate::part::AbstractPart;
use crate::step::{Callout, RotateIcon, Step};
use crate::store::PartStore;
use crate::style::{Brush, Pen, Rgba};

/// Page-level settings shared by every page of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticInfo {
    pub page_size: Size,
    pub resolution: f32,
    /// Corner in which page numbers are drawn.
    pub number_pos: String,
    /// Scale and rotation defaults stored here by older files.
    pub legacy: Option<LegacyScales>,
}

impl Default for StaticInfo {
    fn default() -> Self {
        Self {
            page_size: Size::new(800, 600),
            resolution: 72.0,
            number_pos: "right".to_string(),
            legacy: None,
        }
    }
}

/// CSI / PLI / submodel preview scale and rotation defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyScales {
    pub csi_scale: f32,
    pub pli_scale: f32,
    pub preview_scale: f32,
    pub csi_rotation: [f32; 3],
    pub pli_rotation: [f32; 3],
    pub preview_rotation: [f32; 3],
}

impl Default for LegacyScales {
    fn default() -> Self {
        Self {
            csi_scale: 1.0,
            pli_scale: 1.0,
            preview_scale: 1.0,
            csi_rotation: [20.0, 45.0, 0.0],
            pli_rotation: [20.0, -45.0, 0.0],
            preview_rotation: [20.0, 45.0, 0.0],
        }
    }
}

/// Styles that newer files keep only on the template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateStyles {
    pub page_background: Rgba,
    pub callout_arrow_pen: Pen,
    pub callout_arrow_brush: Brush,
    pub rotate_icon_arrow_pen: Pen,
}

impl Default for TemplateStyles {
    fn default() -> Self {
        Self {
            page_background: Rgba::WHITE,
            callout_arrow_pen: Pen::default(),
            callout_arrow_brush: Brush::solid(Rgba::WHITE),
            rotate_icon_arrow_pen: Pen::default(),
        }
    }
}

/// The single page of a template. Its first step holds the sample parts,
/// a sample callout and a sample rotate icon.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatePage {
    pub page: Page,
}

impl TemplatePage {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// A template page with one step, one callout and a rotate icon.
    #[must_use]
    pub fn sample() -> Self {
        let mut step = Step::new(1);
        let mut callout = Callout::new(1);
        callout.steps.push(Step::new(1));
        step.callouts.push(callout);
        step.rotate_icon = Some(RotateIcon::default());
        let mut page = Page::new(1, 0);
        page.steps.push(step);
        Self { page }
    }

    #[must_use]
    pub fn first_step(&self) -> Option<&Step> {
        self.page.steps.first()
    }

    pub fn first_step_mut(&mut self) -> Option<&mut Step> {
        self.page.steps.first_mut()
    }

    /// Copy per-item styles stored by older files into `styles`. Returns
    /// false when the sample callout or rotate icon is missing.
    pub fn lift_legacy_styles(&self, styles: &mut TemplateStyles) -> bool {
        if let Some(color) = self.page.color {
            styles.page_background = color;
        }
        let Some(step) = self.first_step() else {
            return false;
        };
        let mut complete = true;
        match step.callouts.first() {
            Some(callout) => {
                styles.callout_arrow_pen = callout.arrow.pen.clone();
                styles.callout_arrow_brush = callout.arrow.brush.clone();
            }
            None => complete = false,
        }
        match &step.rotate_icon {
            Some(icon) => styles.rotate_icon_arrow_pen = icon.arrow_pen.clone(),
            None => complete = false,
        }
        complete
    }
}

/// Default styling record.
#[derive(Debug, Clone)]
pub struct Template {
    pub filename: String,
    pub separators_visible: bool,
    pub include_submodels: bool,
    /// Dictionary local to the template's sample model.
    pub store: PartStore,
    pub submodel: AbstractPartId,
    pub page: TemplatePage,
    pub static_info: Option<StaticInfo>,
    pub light_parameters: Vec<f32>,
    pub styles: TemplateStyles,
}

impl Template {
    /// A template with an empty sample model.
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let mut store = PartStore::new();
        let mut model = AbstractPart::new_submodel(filename.clone(), filename.clone());
        if let Some(data) = model.submodel_mut() {
            data.is_main = true;
        }
        let submodel = store.insert_unindexed(model);
        Self {
            filename,
            separators_visible: true,
            include_submodels: false,
            store,
            submodel,
            page: TemplatePage::sample(),
            static_info: Some(StaticInfo::default()),
            light_parameters: Vec::new(),
            styles: TemplateStyles::default(),
        }
    }

    #[must_use]
    pub fn submodel(&self) -> Option<&AbstractPart> {
        self.store.get(self.submodel)
    }
}
