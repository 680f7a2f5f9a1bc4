//! Steps and the items laid out inside them.

use crate::arena::{AbstractPartId, PartInstanceId};
use crate::color::{LicColor, color_code};
use crate::geometry::{PointF, RectF};
use crate::part::Dimensions;
use crate::render::DisplayListId;
use crate::style::{Brush, Font, Frame, Label, Pen, Rgba};

/// One instruction step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub number: i32,
    pub has_number_item: bool,
    pub pos: PointF,
    pub rect: RectF,
    pub max_rect: RectF,
    pub csi: Csi,
    pub pli: Option<Pli>,
    /// The PLI may exist but be switched off.
    pub pli_enabled: bool,
    pub number_item: Label,
    pub callouts: Vec<Callout>,
    pub rotate_icon: Option<RotateIcon>,
    pub custom_number: Option<i32>,
}

impl Step {
    /// An empty step with a PLI and a number label.
    #[must_use]
    pub fn new(number: i32) -> Self {
        Self {
            number,
            has_number_item: true,
            pos: PointF::default(),
            rect: RectF::default(),
            max_rect: RectF::default(),
            csi: Csi::default(),
            pli: Some(Pli::default()),
            pli_enabled: true,
            number_item: Label::default(),
            callouts: Vec::new(),
            rotate_icon: None,
            custom_number: None,
        }
    }

    /// True when the step shows no parts and holds no callouts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.csi.parts.is_empty() && self.callouts.is_empty()
    }

    /// Every part copy shown in this step's callouts.
    pub fn callout_parts(&self) -> impl Iterator<Item = PartInstanceId> + '_ {
        self.callouts.iter().flat_map(Callout::part_ids)
    }
}

/// Construction-step image: the parts newly added in a step plus the
/// render-derived image geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Csi {
    pub pos: PointF,
    pub width: i32,
    pub height: i32,
    pub center: PointF,
    pub scaling: f32,
    pub rotation: [f32; 3],
    /// Parts added in this step; rebuilt on load from part placements.
    pub parts: Vec<PartInstanceId>,
    pub display_list: Option<DisplayListId>,
    /// Derived image data is stale and must be rendered before saving.
    pub dirty: bool,
}

impl Default for Csi {
    fn default() -> Self {
        Self {
            pos: PointF::default(),
            width: 0,
            height: 0,
            center: PointF::default(),
            scaling: 1.0,
            rotation: [0.0; 3],
            parts: Vec::new(),
            display_list: None,
            dirty: true,
        }
    }
}

impl Csi {
    /// Apply a measurement taken by the renderer.
    pub fn apply(&mut self, dims: &Dimensions) {
        self.width = dims.width;
        self.height = dims.height;
        self.center = dims.center;
    }
}

/// Parts-list image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pli {
    pub frame: Frame,
    pub items: Vec<PliItem>,
}

impl Pli {
    /// Item grouping parts of `filename` in colour `code`.
    pub fn item_mut(&mut self, filename: &str, code: i32) -> Option<&mut PliItem> {
        self.items.iter_mut().find(|i| i.matches(filename, code))
    }

    /// Sum of all item quantities.
    #[must_use]
    pub fn total_quantity(&self) -> i32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Count `part` under the item for its (filename, colour), creating
    /// the item when needed. The item quantity follows the part count.
    pub fn add_part(
        &mut self,
        part: PartInstanceId,
        filename: &str,
        color: Option<&LicColor>,
        abstract_part: Option<AbstractPartId>,
    ) {
        let code = color_code(color);
        let index = match self.items.iter().position(|i| i.matches(filename, code)) {
            Some(index) => index,
            None => {
                let mut item = PliItem::new(filename, color.cloned());
                item.abstract_part = abstract_part;
                self.items.push(item);
                self.items.len() - 1
            }
        };
        let item = &mut self.items[index];
        item.parts.push(part);
        item.quantity = item.parts.len() as i32;
    }
}

/// One (part, colour) group in a PLI.
#[derive(Debug, Clone, PartialEq)]
pub struct PliItem {
    pub filename: String,
    pub abstract_part: Option<AbstractPartId>,
    pub color: Option<LicColor>,
    pub quantity: i32,
    pub pos: PointF,
    pub rect: RectF,
    pub number_item: Label,
    pub length_indicator: Option<LengthIndicator>,
    /// Parts counted by this item; rebuilt on load.
    pub parts: Vec<PartInstanceId>,
}

impl PliItem {
    #[must_use]
    pub fn new(filename: impl Into<String>, color: Option<LicColor>) -> Self {
        Self {
            filename: filename.into(),
            abstract_part: None,
            color,
            quantity: 0,
            pos: PointF::default(),
            rect: RectF::default(),
            number_item: Label::default(),
            length_indicator: None,
            parts: Vec::new(),
        }
    }

    #[must_use]
    pub fn color_code(&self) -> i32 {
        color_code(self.color.as_ref())
    }

    #[must_use]
    pub fn matches(&self, filename: &str, code: i32) -> bool {
        self.filename == filename && self.color_code() == code
    }
}

/// Circled length label drawn next to long parts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LengthIndicator {
    pub pos: PointF,
    pub rect: RectF,
    pub font: Font,
    pub text: String,
    pub label_color: Rgba,
    pub pen: Pen,
    pub brush: Brush,
}

/// Arrow from a callout to the spot its parts attach to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalloutArrow {
    pub tip: PointF,
    pub base: PointF,
    pub pen: Pen,
    pub brush: Brush,
}

/// "×N" label on a callout or submodel preview.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuantityLabel {
    pub label: Label,
    pub quantity: i32,
}

/// Nested step sequence attached to a parent step.
#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub number: i32,
    pub show_step_numbers: bool,
    pub border_fit: i32,
    pub frame: Frame,
    pub arrow: CalloutArrow,
    pub quantity_label: Option<QuantityLabel>,
    pub steps: Vec<Step>,
}

impl Callout {
    #[must_use]
    pub fn new(number: i32) -> Self {
        Self {
            number,
            show_step_numbers: false,
            border_fit: 0,
            frame: Frame::default(),
            arrow: CalloutArrow::default(),
            quantity_label: None,
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn step(&self, number: i32) -> Option<&Step> {
        self.steps.iter().find(|s| s.number == number)
    }

    pub fn step_mut(&mut self, number: i32) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.number == number)
    }

    /// Flattened part list across all callout steps, in step order.
    pub fn part_ids(&self) -> impl Iterator<Item = PartInstanceId> + '_ {
        self.steps.iter().flat_map(|s| s.csi.parts.iter().copied())
    }
}

/// Icon telling the reader to turn the model around.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RotateIcon {
    pub frame: Frame,
    pub arrow_pen: Pen,
}

/// Preview image of the submodel a page belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmodelPreview {
    pub row: i32,
    pub frame: Frame,
    pub scaling: f32,
    pub rotation: [f32; 3],
    /// Sub-assemblies show a PLI instead of a rendered model.
    pub is_sub_assembly: bool,
    pub pli: Option<Pli>,
    pub quantity_label: Option<QuantityLabel>,
    /// Explicit image size and centre.
    pub dimensions: Option<PreviewDimensions>,
}

impl Default for SubmodelPreview {
    fn default() -> Self {
        Self {
            row: 0,
            frame: Frame::default(),
            scaling: 1.0,
            rotation: [0.0; 3],
            is_sub_assembly: false,
            pli: None,
            quantity_label: None,
            dimensions: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreviewDimensions {
    pub width: i32,
    pub height: i32,
    pub center_x: i32,
    pub center_y: i32,
}
