//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use tri_fractal::{Channel, Raster};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Assert bytes are a PNG image
pub fn assert_png(bytes: &[u8]) {
    assert!(
        bytes.starts_with(&PNG_SIGNATURE),
        "Expected PNG image, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
}

/// Assert bytes start with the fractal magic
pub fn assert_fractal(bytes: &[u8]) {
    assert!(
        bytes.starts_with(b"FRACTAL"),
        "Expected fractal file, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..7.min(bytes.len())]
    );
}

/// Mean absolute difference of one channel over two equally sized rasters
pub fn mean_abs_diff(a: &Raster, b: &Raster, channel: Channel) -> f64 {
    assert_eq!((a.width(), a.height()), (b.width(), b.height()));
    let mut sum = 0u64;
    for y in 0..a.height() as i64 {
        for x in 0..a.width() as i64 {
            sum += a.get(x, y, channel).abs_diff(b.get(x, y, channel)) as u64;
        }
    }
    sum as f64 / (a.width() as u64 * a.height() as u64) as f64
}
