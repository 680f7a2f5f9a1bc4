//! Styling values carried by layout items: colours, pens, brushes, fonts
//! and embedded images.

use crate::geometry::{PointF, RectF};

/// Colour specification tag of a stored colour.
pub const COLOR_SPEC_INVALID: i8 = 0;
/// RGB colour specification tag.
pub const COLOR_SPEC_RGB: i8 = 1;

/// A 16-bit-per-channel screen colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub spec: i8,
    pub alpha: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub pad: u16,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque colour from 8-bit channels.
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 255)
    }

    /// Colour from 8-bit channels; each channel is widened by replication.
    #[must_use]
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            spec: COLOR_SPEC_RGB,
            alpha: alpha as u16 * 257,
            red: red as u16 * 257,
            green: green as u16 * 257,
            blue: blue as u16 * 257,
            pad: 0,
        }
    }

    #[must_use]
    pub const fn invalid() -> Self {
        Self {
            spec: COLOR_SPEC_INVALID,
            alpha: 0xffff,
            red: 0,
            green: 0,
            blue: 0,
            pad: 0,
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.spec != COLOR_SPEC_INVALID
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Encoded image data (PNG); an empty buffer is a null pixmap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pixmap {
    pub data: Vec<u8>,
}

impl Pixmap {
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.data.is_empty()
    }
}

/// Fill style of a brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushStyle {
    #[default]
    NoBrush,
    Solid,
    /// One of the hatch or dense patterns, by style code.
    Pattern(u8),
    Texture,
}

impl BrushStyle {
    const TEXTURE_CODE: u8 = 24;

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::NoBrush => 0,
            Self::Solid => 1,
            Self::Pattern(code) => code,
            Self::Texture => Self::TEXTURE_CODE,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::NoBrush,
            1 => Self::Solid,
            Self::TEXTURE_CODE => Self::Texture,
            other => Self::Pattern(other),
        }
    }
}

/// Area fill.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Brush {
    pub style: BrushStyle,
    pub color: Rgba,
    /// Only meaningful for [`BrushStyle::Texture`].
    pub texture: Pixmap,
}

impl Brush {
    #[must_use]
    pub fn solid(color: Rgba) -> Self {
        Self {
            style: BrushStyle::Solid,
            color,
            texture: Pixmap::default(),
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Outline style.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub style: u8,
    pub cap: u8,
    pub join: u8,
    pub width: f64,
    pub brush: Brush,
    pub miter_limit: f64,
}

impl Pen {
    pub const NO_PEN: u8 = 0;
    pub const SOLID_LINE: u8 = 1;

    #[must_use]
    pub fn solid(color: Rgba, width: f64) -> Self {
        Self {
            width,
            brush: Brush::solid(color),
            ..Self::default()
        }
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            style: Self::SOLID_LINE,
            cap: 0x10,
            join: 0x40,
            width: 1.0,
            brush: Brush::solid(Rgba::BLACK),
            miter_limit: 2.0,
        }
    }
}

/// Font description.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub point_size: f64,
    pub pixel_size: i32,
    pub style_hint: u8,
    pub weight: u8,
    pub italic: bool,
    pub underline: bool,
    pub strike_out: bool,
    pub fixed_pitch: bool,
}

impl Font {
    const ITALIC: u8 = 0x01;
    const UNDERLINE: u8 = 0x02;
    const STRIKE_OUT: u8 = 0x08;
    const FIXED_PITCH: u8 = 0x10;

    #[must_use]
    pub fn new(family: impl Into<String>, point_size: f64) -> Self {
        Self {
            family: family.into(),
            point_size,
            ..Self::default()
        }
    }

    /// Pack the boolean attributes into the on-disk flag byte.
    #[must_use]
    pub fn flag_bits(&self) -> u8 {
        let mut bits = 0;
        if self.italic {
            bits |= Self::ITALIC;
        }
        if self.underline {
            bits |= Self::UNDERLINE;
        }
        if self.strike_out {
            bits |= Self::STRIKE_OUT;
        }
        if self.fixed_pitch {
            bits |= Self::FIXED_PITCH;
        }
        bits
    }

    /// Restore the boolean attributes from the on-disk flag byte.
    pub fn set_flag_bits(&mut self, bits: u8) {
        self.italic = bits & Self::ITALIC != 0;
        self.underline = bits & Self::UNDERLINE != 0;
        self.strike_out = bits & Self::STRIKE_OUT != 0;
        self.fixed_pitch = bits & Self::FIXED_PITCH != 0;
    }
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            point_size: 15.0,
            pixel_size: -1,
            style_hint: 5,
            weight: 50,
            italic: false,
            underline: false,
            strike_out: false,
            fixed_pitch: false,
        }
    }
}

/// Position, bounding rectangle and (pre-20 files only) per-item border
/// styling of a rounded-rectangle layout item.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub pos: PointF,
    pub rect: RectF,
    pub pen: Pen,
    pub brush: Brush,
    pub corner_radius: i16,
}

impl Frame {
    #[must_use]
    pub fn new(pos: PointF, rect: RectF) -> Self {
        Self {
            pos,
            rect,
            ..Self::default()
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            pos: PointF::default(),
            rect: RectF::default(),
            pen: Pen::default(),
            brush: Brush::none(),
            corner_radius: 0,
        }
    }
}

/// A positioned text label (page number, step number, quantity).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Label {
    pub pos: PointF,
    pub font: Font,
}
