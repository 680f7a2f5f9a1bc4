//! The version-gate table.
//!
//! Every conditionally present field of the format appears here exactly
//! once, in the order the gates were introduced. Readers and writers ask
//! the table through [`Field::present_in`] instead of comparing version
//! numbers themselves.

use std::fmt;

/// Version-dependent fields and behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PliItemLengthIndicator,
    StepRotateIcon,
    MultipleArrows,
    TemplateLightParameters,
    SubmodelDictionary,
    PartInPli,
    PageAnnotations,
    SubmodelPreviewQuantity,
    AnnotationLayer,
    PageNumberPosition,
    TemplateStaticInfo,
    RgbaColor,
    ProgressCount,
    SeparatorVisibility,
    PliIncludeSubmodels,
    CustomNumber,
    SubmodelPreviewDimensions,
    LegacyItemStyles,
    LegacyScales,
    ColorCode,
}

/// Range of versions in which a field is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Stored from this version on.
    Since(i16),
    /// Stored in versions before this one.
    Until(i16),
}

impl Presence {
    #[must_use]
    pub const fn includes(self, version: i16) -> bool {
        match self {
            Self::Since(first) => version >= first,
            Self::Until(removed) => version < removed,
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Since(v) => write!(f, ">= {v}"),
            Self::Until(v) => write!(f, "< {v}"),
        }
    }
}

/// One row of the gate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub field: Field,
    pub presence: Presence,
    pub description: &'static str,
}

const fn since(field: Field, version: i16, description: &'static str) -> Gate {
    Gate {
        field,
        presence: Presence::Since(version),
        description,
    }
}

const fn until(field: Field, version: i16, description: &'static str) -> Gate {
    Gate {
        field,
        presence: Presence::Until(version),
        description,
    }
}

/// All gates, indexed by [`Field`] discriminant.
pub static GATES: [Gate; 20] = [
    since(Field::PliItemLengthIndicator, 2, "length indicator on PLI items"),
    since(Field::StepRotateIcon, 3, "rotate icon on steps"),
    since(Field::MultipleArrows, 4, "arrow count on displaced parts (before: exactly one arrow)"),
    since(Field::TemplateLightParameters, 5, "template light parameters"),
    since(Field::SubmodelDictionary, 6, "submodels in the part dictionary (before: inline list)"),
    since(Field::PartInPli, 7, "isInPLI flag on parts"),
    since(Field::PageAnnotations, 8, "annotation sets on pages"),
    since(Field::SubmodelPreviewQuantity, 9, "quantity label on submodel previews"),
    since(Field::AnnotationLayer, 10, "annotation flag and z-value"),
    since(Field::PageNumberPosition, 11, "page number position"),
    since(Field::TemplateStaticInfo, 12, "static info block in templates"),
    since(Field::RgbaColor, 13, "colours as RGBA + name (before: palette code)"),
    since(Field::ProgressCount, 14, "progress step count"),
    since(Field::SeparatorVisibility, 15, "step separator visibility"),
    since(Field::PliIncludeSubmodels, 16, "PLI include-submodels template flag"),
    since(Field::CustomNumber, 17, "custom page and step numbers"),
    since(Field::SubmodelPreviewDimensions, 18, "submodel preview width, height and center"),
    until(Field::LegacyItemStyles, 20, "per-item pens, brushes, corner radius and page colour"),
    until(Field::LegacyScales, 21, "CSI/PLI/preview scale and rotation in static info"),
    since(Field::ColorCode, 23, "colour code stored with RGBA colours"),
];

impl Field {
    /// The table row for this field.
    #[must_use]
    pub fn gate(self) -> &'static Gate {
        &GATES[self as usize]
    }

    /// Whether a stream of `version` stores this field.
    #[must_use]
    pub fn present_in(self, version: i16) -> bool {
        self.gate().presence.includes(version)
    }
}

/// Every gate with its presence at `version`, in table order.
pub fn describe(version: i16) -> impl Iterator<Item = (&'static Gate, bool)> {
    GATES.iter().map(move |gate| (gate, gate.presence.includes(version)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_discriminant() {
        for (index, gate) in GATES.iter().enumerate() {
            assert_eq!(gate.field as usize, index, "{:?} is out of place", gate.field);
        }
    }

    #[test]
    fn test_table_is_ordered_by_version() {
        let versions: Vec<i16> = GATES
            .iter()
            .map(|g| match g.presence {
                Presence::Since(v) | Presence::Until(v) => v,
            })
            .collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn test_gate_boundaries() {
        assert!(!Field::ColorCode.present_in(22));
        assert!(Field::ColorCode.present_in(23));
        assert!(Field::LegacyItemStyles.present_in(19));
        assert!(!Field::LegacyItemStyles.present_in(20));
        assert!(Field::LegacyScales.present_in(20));
        assert!(!Field::LegacyScales.present_in(21));
        assert!(!Field::SubmodelDictionary.present_in(5));
        assert!(Field::SubmodelDictionary.present_in(6));
    }

    #[test]
    fn test_describe_version_one() {
        let present: Vec<Field> = describe(1)
            .filter(|(_, present)| *present)
            .map(|(gate, _)| gate.field)
            .collect();
        assert_eq!(present, vec![Field::LegacyItemStyles, Field::LegacyScales]);
    }
}
