//! Plane geometry in normalized image space.
//!
//! - [`Point`] / [`Vector`]: positions and displacements in `[0, 1]²`
//! - [`Bounds`]: axis-aligned bounding boxes
//! - [`AffineTransform`]: the map between two triangles under a
//!   [`PointMap`](crate::fit::PointMap)

mod affine;
mod bounds;
mod point;

pub use affine::AffineTransform;
pub use bounds::Bounds;
pub use point::{Point, Vector};

/// Magnitudes below this are treated as zero (determinants, variances).
pub const ZERO: f64 = 1e-12;
