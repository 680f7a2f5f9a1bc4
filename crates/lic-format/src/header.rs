//! Stream header: magic number and format version.

use std::io::Write;

use crate::error::{LicError, Result};
use crate::options::{FIRST_VERSION, FileKind, MAGIC_NUMBER, ReaderOptions};
use crate::stream::{StreamReader, StreamWriter};

/// Byte length of the header.
pub const HEADER_LEN: usize = 6;

fn invalid(kind: FileKind, message: impl Into<String>) -> LicError {
    match kind {
        FileKind::Document => LicError::invalid_format(message),
        FileKind::Template => LicError::invalid_template(message),
    }
}

/// Validate the header of `data` and return the stream version.
///
/// Nothing past the header is touched, so a rejected stream never reaches
/// the record readers.
pub fn read_header(data: &[u8], kind: FileKind, options: &ReaderOptions) -> Result<i16> {
    if data.len() < HEADER_LEN {
        return Err(invalid(kind, "file too small"));
    }
    let mut reader = StreamReader::new(data, 0);
    let magic = reader.read_i32()?;
    if magic != MAGIC_NUMBER {
        return Err(invalid(
            kind,
            format!("not a valid .{} file (magic {magic:#010x})", kind.extension()),
        ));
    }
    let version = reader.read_i16()?;
    if version > options.max_version {
        return Err(LicError::UnsupportedVersion {
            found: version,
            max_supported: options.max_version,
        });
    }
    if version < FIRST_VERSION {
        return Err(invalid(kind, format!("invalid format version {version}")));
    }
    Ok(version)
}

/// Write the magic number and the writer's version.
pub fn write_header<W: Write>(writer: &mut StreamWriter<W>) -> Result<()> {
    writer.write_i32(MAGIC_NUMBER)?;
    let version = writer.version();
    writer.write_i16(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CURRENT_VERSION;

    fn header(magic: i32, version: i16) -> Vec<u8> {
        let mut bytes = magic.to_be_bytes().to_vec();
        bytes.extend_from_slice(&version.to_be_bytes());
        bytes
    }

    #[test]
    fn test_valid_header() {
        let data = header(MAGIC_NUMBER, 17);
        assert_eq!(read_header(&data, FileKind::Document, &ReaderOptions::default()).unwrap(), 17);
    }

    #[test]
    fn test_bad_magic() {
        let data = header(0x1234_5678, CURRENT_VERSION);
        let err = read_header(&data, FileKind::Template, &ReaderOptions::default()).unwrap_err();
        assert!(matches!(err, LicError::InvalidFormat { kind: ".lit", .. }));
    }

    #[test]
    fn test_future_version() {
        let data = header(MAGIC_NUMBER, CURRENT_VERSION + 1);
        let err = read_header(&data, FileKind::Document, &ReaderOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            LicError::UnsupportedVersion {
                found: 24,
                max_supported: 23
            }
        ));
    }

    #[test]
    fn test_reader_cap_applies() {
        let data = header(MAGIC_NUMBER, 15);
        let options = ReaderOptions::new().with_max_version(14);
        assert!(read_header(&data, FileKind::Document, &options).is_err());
    }

    #[test]
    fn test_zero_version_and_short_input() {
        let data = header(MAGIC_NUMBER, 0);
        assert!(matches!(
            read_header(&data, FileKind::Document, &ReaderOptions::default()),
            Err(LicError::InvalidFormat { .. })
        ));
        assert!(read_header(&[0x14], FileKind::Document, &ReaderOptions::default()).is_err());
    }
}
