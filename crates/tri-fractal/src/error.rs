//! Error types for the tri-fractal public API.
//!
//! [`FractalError`] wraps every error the crate produces so callers can use
//! `?` across encoding, decoding and (de)serialization.

use thiserror::Error;

/// Degenerate geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The source triangle is collinear (or nearly so), so no affine map
    /// exists or it cannot be inverted.
    #[error("affine transform is not invertible (determinant {determinant:e})")]
    NotInvertible { determinant: f64 },
}

/// Malformed or inconsistent fractal streams.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("bad magic: expected {expected:?}, found {found:?}")]
    BadMagic {
        expected: &'static str,
        found: String,
    },

    #[error("unexpected end of stream: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("triangle count mismatch: declared {declared}, found {found}")]
    CountMismatch { declared: usize, found: usize },

    #[error("triangle {id} has invalid child count {count}")]
    InvalidChildCount { id: u16, count: u8 },

    #[error("triangle {id} has invalid point map code {code}")]
    InvalidPointMap { id: u16, code: u8 },

    #[error("invalid channel mode byte {0}")]
    InvalidChannelMode(u8),

    #[error("triangle id {id} out of range for a tree of {count} triangles")]
    IdOutOfRange { id: u16, count: usize },

    #[error("triangle id {0} appears more than once")]
    DuplicateId(u16),

    #[error("triangle {from} references missing triangle {to} as its {field}")]
    UnresolvedReference {
        from: u16,
        field: &'static str,
        to: u16,
    },

    #[error("tree still has {unassigned} unassigned triangles")]
    IncompleteTree { unassigned: usize },

    #[error("image dimensions {width}x{height} must be positive and at most {max} pixels")]
    InvalidDimensions { width: i64, height: i64, max: u64 },

    #[error("tree has {0} triangles, more than the format can address")]
    TooManyTriangles(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Unified error type for the tri-fractal public API.
#[derive(Debug, Error)]
pub enum FractalError {
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("format error: {0}")]
    Format(#[from] FormatError),
}
