//! Pages: ordinary instruction pages, the title page and part-list pages.

use crate::geometry::{PointF, RectF};
use crate::step::{Pli, Step, SubmodelPreview};
use crate::style::{Font, Frame, Label, Pen, Pixmap, Rgba};

/// Step placement direction on a page.
pub const LAYOUT_HORIZONTAL: i32 = 0x1;
pub const LAYOUT_VERTICAL: i32 = 0x2;

/// An instruction page owned by a submodel.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: i32,
    pub row: i32,
    pub frame: Frame,
    /// Background colour stored per page by older files.
    pub color: Option<Rgba>,
    pub layout_orientation: i32,
    pub number_item: Label,
    pub custom_number: Option<i32>,
    pub steps: Vec<Step>,
    pub submodel_item: Option<SubmodelPreview>,
    pub separators: Vec<StepSeparator>,
    pub annotations: Vec<Annotation>,
}

impl Page {
    #[must_use]
    pub fn new(number: i32, row: i32) -> Self {
        Self {
            number,
            row,
            frame: Frame::default(),
            color: None,
            layout_orientation: LAYOUT_VERTICAL,
            number_item: Label::default(),
            custom_number: None,
            steps: Vec::new(),
            submodel_item: None,
            separators: Vec::new(),
            annotations: Vec::new(),
        }
    }

    #[must_use]
    pub fn step(&self, number: i32) -> Option<&Step> {
        self.steps.iter().find(|s| s.number == number)
    }

    pub fn step_mut(&mut self, number: i32) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.number == number)
    }

    /// A page is empty when none of its steps shows anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.iter().all(Step::is_empty)
    }

    /// Every PLI on the page, including callout-step PLIs.
    pub fn visit_plis_mut(&mut self, f: &mut impl FnMut(&mut Pli)) {
        fn visit_step(step: &mut Step, f: &mut impl FnMut(&mut Pli)) {
            if let Some(pli) = step.pli.as_mut() {
                f(pli);
            }
            for callout in &mut step.callouts {
                for inner in &mut callout.steps {
                    visit_step(inner, f);
                }
            }
        }
        for step in &mut self.steps {
            visit_step(step, f);
        }
        if let Some(pli) = self.submodel_item.as_mut().and_then(|s| s.pli.as_mut()) {
            f(pli);
        }
    }
}

/// Border line drawn between steps.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSeparator {
    /// Index of the step the separator follows.
    pub index: i32,
    pub pos: PointF,
    pub rect: RectF,
    pub pen: Pen,
    pub enabled: bool,
}

impl StepSeparator {
    #[must_use]
    pub fn new(index: i32) -> Self {
        Self {
            index,
            pos: PointF::default(),
            rect: RectF::default(),
            pen: Pen::default(),
            enabled: true,
        }
    }
}

/// User-placed image on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub pixmap: Pixmap,
    pub filename: String,
    pub pos: PointF,
    /// Annotations draw above page content, plain images below.
    pub is_annotation: bool,
    pub z_value: i32,
}

impl Annotation {
    #[must_use]
    pub fn new(pixmap: Pixmap, filename: impl Into<String>, pos: PointF) -> Self {
        Self {
            pixmap,
            filename: filename.into(),
            pos,
            is_annotation: true,
            z_value: 0,
        }
    }
}

/// Free text on the title page.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleLabel {
    pub pos: PointF,
    pub font: Font,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TitlePage {
    pub frame: Frame,
    pub color: Option<Rgba>,
    pub submodel_item: Option<SubmodelPreview>,
    pub labels: Vec<TitleLabel>,
    pub annotations: Vec<Annotation>,
}

/// Page listing every part of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct PartListPage {
    pub number: i32,
    pub row: i32,
    pub frame: Frame,
    pub color: Option<Rgba>,
    pub number_item: Label,
    pub pli: Pli,
    pub annotations: Vec<Annotation>,
}

impl PartListPage {
    #[must_use]
    pub fn new(number: i32, row: i32) -> Self {
        Self {
            number,
            row,
            frame: Frame::default(),
            color: None,
            number_item: Label::default(),
            pli: Pli::default(),
            annotations: Vec::new(),
        }
    }
}

/// Scene alignment guide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub orientation: i32,
    pub pos: PointF,
}
