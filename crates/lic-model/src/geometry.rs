//! Geometry value types and the immutable drawing primitives of a part.

use crate::color::LicColor;

/// 4x4 column-major transform, as stored on disk.
pub type Matrix = [f32; 16];

/// The identity transform.
pub const IDENTITY_MATRIX: Matrix = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Build a pure translation matrix.
#[must_use]
pub fn translation(x: f32, y: f32, z: f32) -> Matrix {
    let mut m = IDENTITY_MATRIX;
    m[12] = x;
    m[13] = y;
    m[14] = z;
    m
}

/// A point in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in item coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Integer size, used for page dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Kind of an LDraw drawing primitive, keyed by its GL mode constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Lines,
    Triangles,
    Quads,
}

impl PrimitiveKind {
    /// GL mode constant used on disk.
    #[must_use]
    pub const fn gl_mode(self) -> i16 {
        match self {
            Self::Lines => 0x0001,
            Self::Triangles => 0x0004,
            Self::Quads => 0x0007,
        }
    }

    /// Decode a GL mode constant.
    #[must_use]
    pub const fn from_gl_mode(mode: i16) -> Option<Self> {
        match mode {
            0x0001 => Some(Self::Lines),
            0x0004 => Some(Self::Triangles),
            0x0007 => Some(Self::Quads),
            _ => None,
        }
    }

    /// Number of coordinates (x, y, z per vertex) in one primitive.
    #[must_use]
    pub const fn coordinate_count(self) -> usize {
        match self {
            Self::Lines => 6,
            Self::Triangles => 9,
            Self::Quads => 12,
        }
    }
}

/// One coloured line, triangle or quad.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub color: Option<LicColor>,
    pub kind: PrimitiveKind,
    pub winding: i32,
    pub points: Vec<f32>,
}

impl Primitive {
    /// Create a primitive; `points` must hold `kind.coordinate_count()` values.
    #[must_use]
    pub fn new(color: Option<LicColor>, kind: PrimitiveKind, winding: i32, points: Vec<f32>) -> Self {
        debug_assert_eq!(points.len(), kind.coordinate_count());
        Self {
            color,
            kind,
            winding,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gl_mode_round_trip() {
        for kind in [PrimitiveKind::Lines, PrimitiveKind::Triangles, PrimitiveKind::Quads] {
            assert_eq!(PrimitiveKind::from_gl_mode(kind.gl_mode()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_gl_mode(0x0005), None);
    }

    #[test]
    fn test_translation() {
        let m = translation(1.0, 2.0, 3.0);
        assert_eq!(&m[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(m[0], 1.0);
    }
}
