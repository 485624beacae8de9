//! Header record of a fractal file.

use std::io::Write;

use crate::codec::{ByteReader, ByteWriter};
use crate::error::FormatError;

/// Largest image, in pixels, a fractal file may declare or decode to.
pub const MAX_IMAGE_PIXELS: u64 = 1 << 26;

/// Reject empty, negative and oversized dimensions.
pub(crate) fn check_dimensions(width: i64, height: i64) -> Result<(), FormatError> {
    let fits = width > 0
        && height > 0
        && (width as u64).saturating_mul(height as u64) <= MAX_IMAGE_PIXELS;
    if fits {
        Ok(())
    } else {
        Err(FormatError::InvalidDimensions {
            width,
            height,
            max: MAX_IMAGE_PIXELS,
        })
    }
}

/// Dimensions and origin of the encoded image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaData {
    pub width: i32,
    pub height: i32,
    /// Basename of the source file.
    pub source_filename: String,
}

impl MetaData {
    /// Record for an image read from `source`; only the basename of the
    /// path is kept.
    pub fn new(width: u32, height: u32, source: &str) -> Self {
        Self {
            width: i32::try_from(width).unwrap_or(i32::MAX),
            height: i32::try_from(height).unwrap_or(i32::MAX),
            source_filename: basename(source).to_string(),
        }
    }

    /// Width as a pixel count; negative values read as 0.
    pub fn pixel_width(&self) -> u32 {
        u32::try_from(self.width).unwrap_or(0)
    }

    pub fn pixel_height(&self) -> u32 {
        u32::try_from(self.height).unwrap_or(0)
    }

    /// Parse a header; dimensions outside `1..=MAX_IMAGE_PIXELS` are an
    /// error.
    pub fn read(input: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let width = input.read_i32()?;
        let height = input.read_i32()?;
        check_dimensions(width.into(), height.into())?;
        Ok(Self {
            width,
            height,
            source_filename: input.read_string()?,
        })
    }

    pub fn write<W: Write>(&self, out: &mut ByteWriter<W>) -> Result<(), FormatError> {
        out.write_i32(self.width)?;
        out.write_i32(self.height)?;
        out.write_string(&self.source_filename)
    }
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_basename_only() {
        assert_eq!(MetaData::new(1, 1, "/tmp/in/lena.png").source_filename, "lena.png");
        assert_eq!(MetaData::new(1, 1, r"C:\img\a.png").source_filename, "a.png");
        assert_eq!(MetaData::new(1, 1, "plain.png").source_filename, "plain.png");
    }

    #[test]
    fn test_wire_layout() {
        let meta = MetaData::new(640, 480, "x.png");
        let mut out = ByteWriter::new(Vec::new());
        meta.write(&mut out).unwrap();
        let bytes = out.into_inner();
        assert_eq!(
            bytes,
            vec![0, 0, 2, 128, 0, 0, 1, 224, 0, 5, b'x', b'.', b'p', b'n', b'g']
        );
        assert_eq!(MetaData::read(&mut ByteReader::new(&bytes)).unwrap(), meta);
    }

    fn header(width: i32, height: i32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[0, 1, b'a']);
        bytes
    }

    #[test]
    fn test_rejects_unusable_dimensions() {
        for (w, h) in [(0, 10), (10, -1), (i32::MAX, i32::MAX), (1 << 14, 1 << 13)] {
            let bytes = header(w, h);
            let err = MetaData::read(&mut ByteReader::new(&bytes)).unwrap_err();
            assert!(
                matches!(err, FormatError::InvalidDimensions { width, height, .. }
                    if width == w as i64 && height == h as i64),
                "{w}x{h}: {err}"
            );
        }
    }

    #[test]
    fn test_accepts_largest_image() {
        let bytes = header(1 << 13, 1 << 13);
        let meta = MetaData::read(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!((meta.pixel_width(), meta.pixel_height()), (8192, 8192));
    }

    #[test]
    fn test_negative_dimensions_read_as_zero() {
        let meta = MetaData {
            width: -4,
            height: 3,
            source_filename: String::new(),
        };
        assert_eq!(meta.pixel_width(), 0);
        assert_eq!(meta.pixel_height(), 3);
    }
}
