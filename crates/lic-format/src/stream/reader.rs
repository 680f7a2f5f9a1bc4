use lic_model::{
    Brush, BrushStyle, Font, IDENTITY_MATRIX, Matrix, Pen, Pixmap, PointF, RectF, Rgba, Size,
};

use super::NULL_STRING;
use crate::error::{LicError, Result};
use crate::gates::Field;

/// Cursor over an in-memory stream of a known format version.
#[derive(Debug, Clone)]
pub struct StreamReader<'a> {
    data: &'a [u8],
    pos: usize,
    version: i16,
}

impl<'a> StreamReader<'a> {
    /// Reader positioned at the start of `data`.
    pub fn new(data: &'a [u8], version: i16) -> Self {
        Self::at(data, 0, version)
    }

    /// Reader resuming at byte offset `pos`.
    pub fn at(data: &'a [u8], pos: usize, version: i16) -> Self {
        Self { data, pos, version }
    }

    pub fn version(&self) -> i16 {
        self.version
    }

    /// Whether the stream stores `field`.
    pub fn has(&self, field: Field) -> bool {
        field.present_in(self.version)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.data.len());
        let Some(end) = end else {
            return Err(LicError::UnexpectedEof {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        };
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_be_bytes(self.take_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.take_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.take_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.take_array()?))
    }

    /// Element count prefix; negative counts are invalid.
    pub fn read_count(&mut self) -> Result<usize> {
        let offset = self.pos;
        let count = self.read_i32()?;
        usize::try_from(count)
            .map_err(|_| LicError::invalid_format(format!("negative count {count} at offset {offset}")))
    }

    /// String; a null string reads as empty.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()?;
        if len == NULL_STRING {
            return Ok(String::new());
        }
        let offset = self.pos;
        if len % 2 != 0 {
            return Err(LicError::invalid_format(format!(
                "odd string byte length {len} at offset {offset}"
            )));
        }
        let bytes = self.take(len as usize)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units)
            .map_err(|_| LicError::invalid_format(format!("invalid UTF-16 string at offset {offset}")))
    }

    pub fn read_f32x3(&mut self) -> Result<[f32; 3]> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    pub fn read_matrix(&mut self) -> Result<Matrix> {
        let mut matrix = IDENTITY_MATRIX;
        for value in &mut matrix {
            *value = self.read_f32()?;
        }
        Ok(matrix)
    }

    pub fn read_point(&mut self) -> Result<PointF> {
        Ok(PointF::new(self.read_f64()?, self.read_f64()?))
    }

    pub fn read_rect(&mut self) -> Result<RectF> {
        Ok(RectF::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        ))
    }

    pub fn read_size(&mut self) -> Result<Size> {
        Ok(Size::new(self.read_i32()?, self.read_i32()?))
    }

    pub fn read_rgba(&mut self) -> Result<Rgba> {
        Ok(Rgba {
            spec: self.read_i8()?,
            alpha: self.read_u16()?,
            red: self.read_u16()?,
            green: self.read_u16()?,
            blue: self.read_u16()?,
            pad: self.read_u16()?,
        })
    }

    pub fn read_pixmap(&mut self) -> Result<Pixmap> {
        let len = self.read_u32()? as usize;
        Ok(Pixmap::new(self.take(len)?.to_vec()))
    }

    pub fn read_brush(&mut self) -> Result<Brush> {
        let style = BrushStyle::from_code(self.read_u8()?);
        let color = self.read_rgba()?;
        let texture = if style == BrushStyle::Texture {
            self.read_pixmap()?
        } else {
            Pixmap::default()
        };
        Ok(Brush {
            style,
            color,
            texture,
        })
    }

    pub fn read_pen(&mut self) -> Result<Pen> {
        Ok(Pen {
            style: self.read_u8()?,
            cap: self.read_u8()?,
            join: self.read_u8()?,
            width: self.read_f64()?,
            brush: self.read_brush()?,
            miter_limit: self.read_f64()?,
        })
    }

    pub fn read_font(&mut self) -> Result<Font> {
        let mut font = Font {
            family: self.read_string()?,
            point_size: self.read_f64()?,
            pixel_size: self.read_i32()?,
            style_hint: self.read_u8()?,
            weight: self.read_u8()?,
            ..Font::default()
        };
        font.set_flag_bits(self.read_u8()?);
        Ok(font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_integers() {
        let data = [0x14, 0x76, 0x81, 0x26, 0x00, 0x17];
        let mut reader = StreamReader::new(&data, 23);
        assert_eq!(reader.read_i32().unwrap(), 0x1476_8126);
        assert_eq!(reader.read_i16().unwrap(), 23);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_utf16_string() {
        let data = [0, 0, 0, 4, 0, b'h', 0, b'i'];
        let mut reader = StreamReader::new(&data, 23);
        assert_eq!(reader.read_string().unwrap(), "hi");
    }

    #[test]
    fn test_null_string_reads_empty() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF];
        let mut reader = StreamReader::new(&data, 23);
        assert_eq!(reader.read_string().unwrap(), "");
    }

    #[test]
    fn test_truncated_read_reports_offset() {
        let data = [0, 0];
        let mut reader = StreamReader::new(&data, 23);
        let err = reader.read_i32().unwrap_err();
        assert!(matches!(
            err,
            LicError::UnexpectedEof {
                offset: 0,
                needed: 2
            }
        ));
    }

    #[test]
    fn test_negative_count_is_invalid() {
        let data = (-1i32).to_be_bytes();
        let mut reader = StreamReader::new(&data, 23);
        assert!(matches!(reader.read_count(), Err(LicError::InvalidFormat { .. })));
    }

    #[test]
    fn test_gate_query_uses_stream_version() {
        let reader = StreamReader::new(&[], 12);
        assert!(reader.has(Field::TemplateStaticInfo));
        assert!(!reader.has(Field::RgbaColor));
    }
}
