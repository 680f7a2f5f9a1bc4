//! Shared part geometry ([`AbstractPart`]), submodels, and placed parts.

use crate::arena::{AbstractPartId, PartInstanceId};
use crate::color::LicColor;
use crate::geometry::{IDENTITY_MATRIX, Matrix, PointF, Primitive};
use crate::page::Page;
use crate::render::DisplayListId;

/// Filename sentinel identifying an arrow record.
pub const ARROW_FILENAME: &str = "arrow";

/// Render-derived size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
    pub left_inset: i32,
    pub bottom_inset: i32,
    pub center: PointF,
}

/// Shared geometry definition, keyed by filename.
///
/// A submodel is an abstract part that additionally carries
/// [`SubmodelData`]; the main model is a submodel flagged `is_main`.
#[derive(Debug, Clone, PartialEq)]
pub struct AbstractPart {
    pub filename: String,
    pub name: String,
    pub is_primitive: bool,
    pub dimensions: Dimensions,
    pub pli_scale: f32,
    pub pli_rotation: [f32; 3],
    pub primitives: Vec<Primitive>,
    /// Child placements, in file order.
    pub parts: Vec<PartInstanceId>,
    /// Compiled geometry; never persisted.
    pub display_list: Option<DisplayListId>,
    pub submodel: Option<Box<SubmodelData>>,
}

impl AbstractPart {
    #[must_use]
    pub fn new(filename: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            name: name.into(),
            is_primitive: false,
            dimensions: Dimensions::default(),
            pli_scale: 1.0,
            pli_rotation: [0.0; 3],
            primitives: Vec::new(),
            parts: Vec::new(),
            display_list: None,
            submodel: None,
        }
    }

    /// A new submodel with no pages.
    #[must_use]
    pub fn new_submodel(filename: impl Into<String>, name: impl Into<String>) -> Self {
        let mut part = Self::new(filename, name);
        part.submodel = Some(Box::default());
        part
    }

    #[must_use]
    pub fn is_submodel(&self) -> bool {
        self.submodel.is_some()
    }

    #[must_use]
    pub fn is_main_model(&self) -> bool {
        self.submodel.as_ref().is_some_and(|s| s.is_main)
    }

    #[must_use]
    pub fn submodel(&self) -> Option<&SubmodelData> {
        self.submodel.as_deref()
    }

    pub fn submodel_mut(&mut self) -> Option<&mut SubmodelData> {
        self.submodel.as_deref_mut()
    }

    /// Pages of a submodel; empty for plain parts.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        self.submodel().map_or(&[], |s| s.pages.as_slice())
    }
}

/// Where a submodel hangs in the instruction tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentRef {
    /// Not linked yet.
    #[default]
    Unresolved,
    /// Directly under the document root.
    Instructions,
    MainModel,
    Submodel(AbstractPartId),
    /// The stored parent name has no dictionary entry.
    Dangling,
}

/// Submodel-only state of an [`AbstractPart`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmodelData {
    pub pages: Vec<Page>,
    /// Child submodel filenames as stored.
    pub submodel_names: Vec<String>,
    /// Child submodels, filled by linking.
    pub submodels: Vec<AbstractPartId>,
    /// Position among the parent's children in tree order.
    pub row: i32,
    /// Parent filename as stored: empty for the root, the instructions
    /// filename for the main model, otherwise a submodel filename.
    pub parent_name: String,
    pub parent: ParentRef,
    /// True once a live part or parent submodel references this submodel.
    pub used: bool,
    pub is_sub_assembly: bool,
    pub is_main: bool,
}

impl SubmodelData {
    #[must_use]
    pub fn page(&self, number: i32) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == number)
    }

    pub fn page_mut(&mut self, number: i32) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.number == number)
    }
}

/// Exploded-view movement direction, stored as the key code that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplaceDirection(pub i32);

impl DisplaceDirection {
    pub const LEFT: Self = Self(0x0100_0012);
    pub const UP: Self = Self(0x0100_0013);
    pub const RIGHT: Self = Self(0x0100_0014);
    pub const DOWN: Self = Self(0x0100_0015);
    pub const BACKWARD: Self = Self(0x0100_0016);
    pub const FORWARD: Self = Self(0x0100_0017);

    /// The reverse movement; unknown codes map to themselves.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::LEFT => Self::RIGHT,
            Self::RIGHT => Self::LEFT,
            Self::UP => Self::DOWN,
            Self::DOWN => Self::UP,
            Self::BACKWARD => Self::FORWARD,
            Self::FORWARD => Self::BACKWARD,
            other => other,
        }
    }
}

impl Default for DisplaceDirection {
    fn default() -> Self {
        Self::UP
    }
}

/// Offset of a displaced part and the arrows drawn for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Displacement {
    pub offset: [f32; 3],
    pub direction: DisplaceDirection,
    pub arrows: Vec<Arrow>,
}

/// Placed indicator arrow for a displaced part. Stored on disk as a part
/// record with filename [`ARROW_FILENAME`].
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub color: Option<LicColor>,
    pub matrix: Matrix,
    pub invert: bool,
    pub in_callout: bool,
    pub page_number: i32,
    pub step_number: i32,
    pub is_in_pli: bool,
    pub offset: [f32; 3],
    pub direction: DisplaceDirection,
    pub length: i32,
    pub axis_rotation: f32,
}

impl Arrow {
    /// An arrow pointing along `direction` from the part's rest position.
    #[must_use]
    pub fn new(direction: DisplaceDirection, offset: [f32; 3]) -> Self {
        Self {
            color: None,
            matrix: IDENTITY_MATRIX,
            invert: false,
            in_callout: false,
            page_number: -1,
            step_number: -1,
            is_in_pli: false,
            offset,
            direction,
            length: 2,
            axis_rotation: 0.0,
        }
    }
}

/// One placement of an abstract part.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub filename: String,
    /// Filled by linking; `None` while unresolved or dangling.
    pub abstract_part: Option<AbstractPartId>,
    pub color: Option<LicColor>,
    pub matrix: Matrix,
    pub invert: bool,
    pub in_callout: bool,
    /// Page on which the part was added, or negative when not placed.
    pub page_number: i32,
    pub step_number: i32,
    pub is_in_pli: bool,
    pub displacement: Option<Displacement>,
    /// Copy of this part shown in a callout.
    pub callout_part: Option<PartInstanceId>,
    /// For a callout copy, the part it duplicates.
    pub original_part: Option<PartInstanceId>,
}

impl Part {
    #[must_use]
    pub fn new(filename: impl Into<String>, color: Option<LicColor>, matrix: Matrix) -> Self {
        Self {
            filename: filename.into(),
            abstract_part: None,
            color,
            matrix,
            invert: false,
            in_callout: false,
            page_number: -1,
            step_number: -1,
            is_in_pli: true,
            displacement: None,
            callout_part: None,
            original_part: None,
        }
    }

    /// Whether the part has a recorded page/step placement.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.page_number >= 0 && self.step_number >= 0
    }

    /// Structural identity used to pair a part with its callout copy.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.filename == other.filename && self.matrix == other.matrix && self.color == other.color
    }

    /// Move the part and attach one arrow.
    pub fn displace(&mut self, direction: DisplaceDirection, offset: [f32; 3]) {
        self.displacement = Some(Displacement {
            offset,
            direction,
            arrows: vec![Arrow::new(direction, offset)],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTable;

    #[test]
    fn test_submodel_flags() {
        let plain = AbstractPart::new("3001.dat", "Brick 2 x 4");
        assert!(!plain.is_submodel());
        assert!(plain.pages().is_empty());

        let mut sub = AbstractPart::new_submodel("wing.ldr", "Wing");
        assert!(sub.is_submodel());
        assert!(!sub.is_main_model());
        if let Some(data) = sub.submodel_mut() {
            data.is_main = true;
        }
        assert!(sub.is_main_model());
    }

    #[test]
    fn test_part_matching_uses_filename_matrix_and_color() {
        let colors = ColorTable::ldraw();
        let red = colors.get(4).cloned();
        let a = Part::new("3001.dat", red.clone(), IDENTITY_MATRIX);
        let mut b = Part::new("3001.dat", red, IDENTITY_MATRIX);
        b.in_callout = true;
        assert!(a.matches(&b));

        let c = Part::new("3001.dat", colors.get(1).cloned(), IDENTITY_MATRIX);
        assert!(!a.matches(&c));
    }

    #[test]
    fn test_opposite_direction() {
        assert_eq!(DisplaceDirection::UP.opposite(), DisplaceDirection::DOWN);
        assert_eq!(DisplaceDirection(7).opposite(), DisplaceDirection(7));
    }

    #[test]
    fn test_placement() {
        let mut part = Part::new("3001.dat", None, IDENTITY_MATRIX);
        assert!(!part.is_placed());
        part.page_number = 1;
        part.step_number = 1;
        assert!(part.is_placed());
    }
}
