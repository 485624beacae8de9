//! Pixel storage and sampling.
//!
//! - [`Raster`]: 8-bit grey or RGB pixels
//! - [`EdgeMap`]: Sobel / Laplacian edge strength, used to place splits
//! - [`DoubleImage`]: one channel in unit coordinates; owns sampling, fitting
//!   and painting for a single tree
//! - [`Canvas`]: order-independent accumulation for decode iterations

mod canvas;
mod double_image;
mod edges;
mod raster;

pub use canvas::Canvas;
pub use double_image::DoubleImage;
pub use edges::EdgeMap;
pub use raster::{Channel, Raster};
