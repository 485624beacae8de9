//! Binary stream primitives.
//!
//! All integers are big-endian. Real values are stored as quantized
//! fractions: a signed 32-bit integer `round(0x7FFFFFFF * t)` where `t` is
//! the value's position within a fixed range.

mod bytes;

pub use bytes::{quantize, ByteReader, ByteWriter};
