//! Whole-image encoding, the `FRACTAL` file format and decoding.

mod fractal_image;
mod metadata;
mod progress;

pub use fractal_image::{FractalImage, ImageType};
pub use metadata::{MetaData, MAX_IMAGE_PIXELS};
pub use progress::{EncodeProgress, NoProgress};
