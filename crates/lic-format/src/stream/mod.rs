//! Big-endian stream primitives.
//!
//! | Value | Encoding |
//! |-------|----------|
//! | bool | u8 |
//! | int16 / int32 | two's complement |
//! | float | IEEE f32 |
//! | point, rect | f64 components |
//! | size | two i32 |
//! | string | u32 byte length (`0xFFFFFFFF` = null) + UTF-16BE |
//! | colour | i8 spec + u16 alpha, red, green, blue, pad |
//! | pen | u8 style, cap, join + f64 width + brush + f64 miter limit |
//! | brush | u8 style + colour (+ pixmap for texture brushes) |
//! | font | family string, f64 point size, i32 pixel size, u8 hint, weight, flags |
//! | pixmap | u32 byte length + encoded image |

mod reader;
mod writer;

pub use reader::StreamReader;
pub use writer::StreamWriter;

/// Byte length marking a null string.
pub(crate) const NULL_STRING: u32 = 0xFFFF_FFFF;
