//! Value fitting between triangles.
//!
//! - [`PointMap`]: which vertex of the source lands on which vertex of the
//!   destination
//! - [`fit_values`]: the closed-form contrast/brightness regression
//! - [`TriFit`]: the fractal code stored on a terminal triangle

mod point_map;
mod regression;
mod tri_fit;

pub use point_map::PointMap;
pub use regression::{fit_flat, fit_values, residual, ValueFit, BRIGHTNESS_LIMIT};
pub use tri_fit::TriFit;
