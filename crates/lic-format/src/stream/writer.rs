use std::io::Write;

use lic_model::{Brush, BrushStyle, Font, Matrix, Pen, Pixmap, PointF, RectF, Rgba, Size};

use crate::error::Result;
use crate::gates::Field;

/// Big-endian writer for one format version.
#[derive(Debug)]
pub struct StreamWriter<W: Write> {
    writer: W,
    version: i16,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(writer: W, version: i16) -> Self {
        Self { writer, version }
    }

    pub fn version(&self) -> i16 {
        self.version
    }

    /// Whether the target version stores `field`.
    pub fn has(&self, field: Field) -> bool {
        field.present_in(self.version)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.bytes(&[value])
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.bytes(&value.to_be_bytes())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(u8::from(value))
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.bytes(&value.to_be_bytes())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.bytes(&value.to_be_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.bytes(&value.to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.bytes(&value.to_be_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.bytes(&value.to_be_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.bytes(&value.to_be_bytes())
    }

    pub fn write_count(&mut self, count: usize) -> Result<()> {
        self.write_i32(count as i32)
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.write_u32((units.len() * 2) as u32)?;
        for unit in units {
            self.write_u16(unit)?;
        }
        Ok(())
    }

    pub fn write_f32x3(&mut self, values: &[f32; 3]) -> Result<()> {
        for value in values {
            self.write_f32(*value)?;
        }
        Ok(())
    }

    pub fn write_matrix(&mut self, matrix: &Matrix) -> Result<()> {
        for value in matrix {
            self.write_f32(*value)?;
        }
        Ok(())
    }

    pub fn write_point(&mut self, point: PointF) -> Result<()> {
        self.write_f64(point.x)?;
        self.write_f64(point.y)
    }

    pub fn write_rect(&mut self, rect: RectF) -> Result<()> {
        self.write_f64(rect.x)?;
        self.write_f64(rect.y)?;
        self.write_f64(rect.width)?;
        self.write_f64(rect.height)
    }

    pub fn write_size(&mut self, size: Size) -> Result<()> {
        self.write_i32(size.width)?;
        self.write_i32(size.height)
    }

    pub fn write_rgba(&mut self, color: &Rgba) -> Result<()> {
        self.write_i8(color.spec)?;
        self.write_u16(color.alpha)?;
        self.write_u16(color.red)?;
        self.write_u16(color.green)?;
        self.write_u16(color.blue)?;
        self.write_u16(color.pad)
    }

    pub fn write_pixmap(&mut self, pixmap: &Pixmap) -> Result<()> {
        self.write_u32(pixmap.data.len() as u32)?;
        self.bytes(&pixmap.data)
    }

    pub fn write_brush(&mut self, brush: &Brush) -> Result<()> {
        self.write_u8(brush.style.code())?;
        self.write_rgba(&brush.color)?;
        if brush.style == BrushStyle::Texture {
            self.write_pixmap(&brush.texture)?;
        }
        Ok(())
    }

    pub fn write_pen(&mut self, pen: &Pen) -> Result<()> {
        self.write_u8(pen.style)?;
        self.write_u8(pen.cap)?;
        self.write_u8(pen.join)?;
        self.write_f64(pen.width)?;
        self.write_brush(&pen.brush)?;
        self.write_f64(pen.miter_limit)
    }

    pub fn write_font(&mut self, font: &Font) -> Result<()> {
        self.write_string(&font.family)?;
        self.write_f64(font.point_size)?;
        self.write_i32(font.pixel_size)?;
        self.write_u8(font.style_hint)?;
        self.write_u8(font.weight)?;
        self.write_u8(font.flag_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamReader;

    #[test]
    fn test_string_encoding() {
        let mut writer = StreamWriter::new(Vec::new(), 23);
        writer.write_string("Ab").unwrap();
        assert_eq!(writer.into_inner(), vec![0, 0, 0, 4, 0, b'A', 0, b'b']);
    }

    #[test]
    fn test_styled_values_read_back() {
        let mut font = Font::new("Verdana", 10.5);
        font.underline = true;
        let pen = Pen::solid(Rgba::rgb(200, 10, 10), 2.5);
        let brush = Brush {
            style: BrushStyle::Texture,
            color: Rgba::BLACK,
            texture: Pixmap::new(vec![0x89, b'P', b'N', b'G']),
        };

        let mut writer = StreamWriter::new(Vec::new(), 23);
        writer.write_font(&font).unwrap();
        writer.write_pen(&pen).unwrap();
        writer.write_brush(&brush).unwrap();
        writer.write_string("Grün").unwrap();
        let bytes = writer.into_inner();

        let mut reader = StreamReader::new(&bytes, 23);
        assert_eq!(reader.read_font().unwrap(), font);
        assert_eq!(reader.read_pen().unwrap(), pen);
        assert_eq!(reader.read_brush().unwrap(), brush);
        assert_eq!(reader.read_string().unwrap(), "Grün");
        assert_eq!(reader.remaining(), 0);
    }
}
