//! LDraw colours and the built-in palette.

use std::collections::BTreeMap;

/// Code meaning "inherit the colour of the enclosing part".
pub const CURRENT_COLOR: i32 = 16;
/// Code meaning "edge colour complementing the enclosing part".
pub const COMPLEMENT_COLOR: i32 = 24;

/// A named RGBA colour tied to an LDraw colour code.
#[derive(Debug, Clone, PartialEq)]
pub struct LicColor {
    pub rgba: [f32; 4],
    pub name: String,
    pub code: i32,
}

impl LicColor {
    #[must_use]
    pub fn new(rgba: [f32; 4], name: impl Into<String>, code: i32) -> Self {
        Self {
            rgba,
            name: name.into(),
            code,
        }
    }
}

/// Colour code of an optional colour; `None` stands for [`CURRENT_COLOR`].
#[must_use]
pub fn color_code(color: Option<&LicColor>) -> i32 {
    color.map_or(CURRENT_COLOR, |c| c.code)
}

const LDRAW_PALETTE: &[(i32, [f32; 4], &str)] = &[
    (0, [0.13, 0.13, 0.13, 1.0], "Black"),
    (1, [0.00, 0.20, 0.70, 1.0], "Blue"),
    (2, [0.00, 0.55, 0.08, 1.0], "Green"),
    (3, [0.00, 0.60, 0.62, 1.0], "Teal"),
    (4, [0.77, 0.00, 0.15, 1.0], "Red"),
    (5, [0.87, 0.40, 0.58, 1.0], "Dark Pink"),
    (6, [0.36, 0.13, 0.00, 1.0], "Brown"),
    (7, [0.76, 0.76, 0.76, 1.0], "Grey"),
    (8, [0.39, 0.37, 0.32, 1.0], "Dark Grey"),
    (9, [0.42, 0.67, 0.86, 1.0], "Light Blue"),
    (10, [0.42, 0.93, 0.56, 1.0], "Bright Green"),
    (11, [0.20, 0.65, 0.65, 1.0], "Turquoise"),
    (12, [1.00, 0.52, 0.48, 1.0], "Salmon"),
    (13, [0.98, 0.64, 0.78, 1.0], "Pink"),
    (14, [1.00, 0.86, 0.00, 1.0], "Yellow"),
    (15, [1.00, 1.00, 1.00, 1.0], "White"),
    (17, [0.73, 1.00, 0.81, 1.0], "Pastel Green"),
    (18, [0.99, 0.91, 0.59, 1.0], "Light Yellow"),
    (19, [0.91, 0.81, 0.63, 1.0], "Tan"),
    (20, [0.84, 0.77, 0.90, 1.0], "Light Violet"),
    (21, [0.88, 1.00, 0.69, 1.0], "Glow in the Dark"),
    (22, [0.51, 0.00, 0.48, 1.0], "Violet"),
    (23, [0.28, 0.20, 0.69, 1.0], "Violet Blue"),
    (25, [0.98, 0.38, 0.00, 1.0], "Orange"),
    (26, [0.85, 0.11, 0.43, 1.0], "Magenta"),
    (27, [0.84, 0.94, 0.00, 1.0], "Lime"),
    (28, [0.77, 0.59, 0.31, 1.0], "Dark Tan"),
    (32, [0.39, 0.37, 0.32, 0.70], "Trans Gray"),
    (33, [0.00, 0.13, 0.63, 0.70], "Trans Blue"),
    (34, [0.02, 0.39, 0.20, 0.70], "Trans Green"),
    (35, [0.00, 0.66, 0.66, 0.60], "Trans Dark Cyan"),
    (36, [0.77, 0.00, 0.15, 0.70], "Trans Red"),
    (37, [0.39, 0.00, 0.38, 0.60], "Trans Violet"),
    (38, [0.40, 0.20, 0.00, 0.60], "Trans Brown"),
    (39, [0.59, 0.59, 0.59, 0.60], "Trans Light Gray"),
    (40, [0.40, 0.40, 0.34, 0.60], "Trans Dark Gray"),
    (41, [0.68, 0.94, 0.93, 0.75], "Trans Light Cyan"),
    (42, [0.75, 1.00, 0.00, 0.70], "Trans Lime"),
    (43, [0.33, 0.66, 1.00, 0.60], "Trans Cyan"),
    (44, [1.00, 0.33, 0.33, 0.60], "Trans Light Red"),
    (45, [0.87, 0.40, 0.58, 0.60], "Trans Pink"),
    (46, [0.79, 0.69, 0.00, 0.70], "Trans Yellow"),
    (47, [1.00, 1.00, 1.00, 0.70], "Trans White"),
    (57, [0.98, 0.38, 0.00, 0.60], "Trans Orange"),
    (70, [0.41, 0.25, 0.15, 1.0], "Reddish Brown"),
    (71, [0.64, 0.64, 0.64, 1.0], "Stone Gray"),
    (72, [0.39, 0.37, 0.38, 1.0], "Dark Stone Gray"),
    (134, [0.58, 0.53, 0.40, 1.0], "Pearl Copper"),
    (135, [0.67, 0.68, 0.67, 1.0], "Pearl Gray"),
    (137, [0.42, 0.48, 0.59, 1.0], "Pearl Sand Blue"),
    (142, [0.84, 0.66, 0.29, 1.0], "Pearl Gold"),
    (256, [0.13, 0.13, 0.13, 1.0], "Rubber Black"),
    (272, [0.00, 0.11, 0.41, 1.0], "Dark Blue"),
    (273, [0.00, 0.20, 0.70, 1.0], "Rubber Blue"),
    (288, [0.15, 0.27, 0.17, 1.0], "Dark Green"),
    (320, [0.47, 0.00, 0.11, 1.0], "Dark Red"),
    (324, [0.77, 0.00, 0.15, 1.0], "Rubber Red"),
    (334, [0.88, 0.43, 0.07, 1.0], "Chrome Gold"),
    (335, [0.75, 0.53, 0.51, 1.0], "Sand Red"),
    (366, [0.82, 0.51, 0.02, 1.0], "Earth Orange"),
    (373, [0.52, 0.37, 0.52, 1.0], "Sand Violet"),
    (375, [0.76, 0.76, 0.76, 1.0], "Rubber Gray"),
    (378, [0.63, 0.74, 0.67, 1.0], "Sand Green"),
    (379, [0.42, 0.48, 0.59, 1.0], "Sand Blue"),
    (382, [0.91, 0.81, 0.63, 1.0], "Tan"),
    (431, [0.73, 1.00, 0.81, 1.0], "Pastel Green"),
    (462, [1.00, 0.62, 0.02, 1.0], "Light Orange"),
    (484, [0.70, 0.24, 0.00, 1.0], "Dark Orange"),
    (494, [0.82, 0.82, 0.82, 1.0], "Electric Contact"),
    (503, [0.90, 0.89, 0.85, 1.0], "Light Gray"),
    (511, [1.00, 1.00, 1.00, 1.0], "Rubber White"),
    (999, [0.0, 0.0, 0.0, 1.0], "True Black"),
];

/// Lookup table from LDraw code to colour.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    colors: BTreeMap<i32, LicColor>,
}

impl ColorTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard LDraw palette.
    #[must_use]
    pub fn ldraw() -> Self {
        let colors = LDRAW_PALETTE
            .iter()
            .map(|&(code, rgba, name)| (code, LicColor::new(rgba, name, code)))
            .collect();
        Self { colors }
    }

    /// Add or replace a colour.
    pub fn insert(&mut self, color: LicColor) {
        self.colors.insert(color.code, color);
    }

    #[must_use]
    pub fn get(&self, code: i32) -> Option<&LicColor> {
        self.colors.get(&code)
    }

    /// Colour for a palette code; the two meta codes map to `None`.
    #[must_use]
    pub fn resolve(&self, code: i32) -> Option<&LicColor> {
        match code {
            CURRENT_COLOR | COMPLEMENT_COLOR => None,
            _ => self.get(code),
        }
    }

    #[must_use]
    pub fn contains(&self, code: i32) -> bool {
        self.colors.contains_key(&code)
    }

    /// First colour (by code) carrying `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&LicColor> {
        self.colors.values().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LicColor> {
        self.colors.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
