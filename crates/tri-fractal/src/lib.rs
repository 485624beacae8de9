#![allow(clippy::module_inception)]
//! tri-fractal: triangle-partitioned fractal image compression
//!
//! An image is covered by a forest of triangles. Every terminal triangle
//! stores a *fractal code*: a larger triangle elsewhere in the same image,
//! the vertex correspondence between the two, and a contrast/brightness
//! pair mapping the larger triangle's intensities onto the smaller one's.
//! Decoding applies all codes repeatedly to an arbitrary seed image until it
//! settles on the attractor, which approximates the original.
//!
//! # Quick Start
//!
//! ```
//! use tri_fractal::{
//!     DecoderOptions, EncoderOptions, FractalImage, ImageType, NoProgress, Raster,
//! };
//!
//! let pixels: Vec<u8> = (0..16 * 16).map(|i| (i % 16 * 16) as u8).collect();
//! let raster = Raster::from_grey(16, 16, pixels);
//!
//! let options = EncoderOptions::new().error_cutoff(8.0).max_triangles(200);
//! let mut fractal = FractalImage::new(raster, ImageType::Greyscale, options, "ramp.png");
//! fractal.encode(&mut NoProgress);
//!
//! let bytes = fractal.to_bytes().unwrap();
//! let mut loaded = FractalImage::unserialize(&bytes).unwrap();
//! let decoded = loaded.decode(&DecoderOptions::new().iterations(8)).unwrap();
//! assert_eq!((decoded.width(), decoded.height()), (16, 16));
//! ```
//!
//! # Encoding
//!
//! Each channel gets its own [`TriangleTree`]. The tree starts with the two
//! halves of the unit square and processes triangles breadth-first:
//!
//! 1. collect every coarser triangle ([`Forest::collect_above`])
//! 2. keep those at least `min_search_ratio` times larger by area
//! 3. for each, try the six vertex correspondences ([`PointMap`]) and fit
//!    `dest ≈ s·source + o` by least squares
//! 4. accept the best fit if its error is below the cutoff, otherwise split
//!    the triangle into four and queue the children
//!
//! Split points are placed along each edge where the edge map
//! ([`EdgeMap`]) is strongest ([`DivideType::HighEntropy`]), weakest, or at
//! the midpoint.
//!
//! # Coordinates
//!
//! All geometry lives in the unit square. Only [`DoubleImage`] converts to
//! pixels, so a fractal can be decoded at any resolution.
//!
//! # File Format
//!
//! ```text
//! "FRACTAL" width:i32 height:i32 name:u16+bytes mode:u8 TREE{1|3}
//! ```
//!
//! Integers are big-endian and real values are 31-bit quantized fractions
//! of a fixed range; see [`codec`] and [`TriangleTree::serialize`].

pub mod codec;
pub mod error;
pub mod fit;
pub mod fractal;
pub mod geometry;
pub mod image;
pub mod options;
pub mod tree;
pub mod triangle;


pub use error::{FormatError, FractalError, GeometryError};
pub use fit::{PointMap, TriFit};
pub use fractal::{
    EncodeProgress, FractalImage, ImageType, MetaData, NoProgress, MAX_IMAGE_PIXELS,
};
pub use geometry::{AffineTransform, Point};
pub use image::{Canvas, Channel, DoubleImage, EdgeMap, Raster};
pub use options::{
    DecoderOptions, DivideType, EdgeDetector, EncoderOptions, ErrorMetric, SamplingType,
    SubdivisionMethod,
};
pub use tree::{TreeStats, TriangleTree};
pub use triangle::{Forest, Triangle, TriangleId};
