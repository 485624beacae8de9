//! Big-endian primitives of the fractal stream.

use std::io::Write;

use crate::error::FormatError;

/// Full scale of a quantized fraction.
const FRACTION_SCALE: f64 = 0x7FFF_FFFF as f64;

/// Cursor over an in-memory fractal stream.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    off: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, off: 0 }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.off
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.off
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if n > self.remaining() {
            return Err(FormatError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.off..self.off + n];
        self.off += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, FormatError> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, FormatError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    /// Consume `magic` or fail with [`FormatError::BadMagic`].
    pub fn expect_magic(&mut self, magic: &'static str) -> Result<(), FormatError> {
        let found = self.take(magic.len())?;
        if found != magic.as_bytes() {
            return Err(FormatError::BadMagic {
                expected: magic,
                found: String::from_utf8_lossy(found).into_owned(),
            });
        }
        Ok(())
    }

    /// u16-length-prefixed string. Invalid UTF-8 is replaced, not rejected.
    pub fn read_string(&mut self) -> Result<String, FormatError> {
        let len = self.read_u16()? as usize;
        Ok(String::from_utf8_lossy(self.take(len)?).into_owned())
    }

    /// Quantized fraction over `[min, max]`.
    pub fn read_fraction(&mut self, min: f64, max: f64) -> Result<f64, FormatError> {
        let raw = self.read_i32()?;
        let value = min + (max - min) * (raw as f64 / FRACTION_SCALE);
        Ok(value.clamp(min, max))
    }
}

/// Big-endian writer over any [`Write`] sink.
#[derive(Debug)]
pub struct ByteWriter<W: Write> {
    out: W,
}

impl<W: Write> ByteWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_u8(&mut self, v: u8) -> Result<(), FormatError> {
        Ok(self.out.write_all(&[v])?)
    }

    pub fn write_u16(&mut self, v: u16) -> Result<(), FormatError> {
        Ok(self.out.write_all(&v.to_be_bytes())?)
    }

    pub fn write_i32(&mut self, v: i32) -> Result<(), FormatError> {
        Ok(self.out.write_all(&v.to_be_bytes())?)
    }

    pub fn write_magic(&mut self, magic: &str) -> Result<(), FormatError> {
        Ok(self.out.write_all(magic.as_bytes())?)
    }

    /// u16-length-prefixed string, truncated at a character boundary to
    /// fit the prefix.
    pub fn write_string(&mut self, s: &str) -> Result<(), FormatError> {
        let mut end = s.len().min(u16::MAX as usize);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.write_u16(end as u16)?;
        Ok(self.out.write_all(&s.as_bytes()[..end])?)
    }

    /// Store `value` clamped into `[min, max]` as a 31-bit fraction of the
    /// range.
    pub fn write_fraction(&mut self, value: f64, min: f64, max: f64) -> Result<(), FormatError> {
        self.write_i32(quantize(value, min, max))
    }
}

/// `round(0x7FFFFFFF * (clamp(value) - min) / (max - min))`. NaN maps to 0.
pub fn quantize(value: f64, min: f64, max: f64) -> i32 {
    if value.is_nan() || max <= min {
        return 0;
    }
    let ratio = (value.clamp(min, max) - min) / (max - min);
    (FRACTION_SCALE * ratio).round() as i32
}
