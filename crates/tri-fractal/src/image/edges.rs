//! Edge-strength maps used to place split points.

use super::{Channel, Raster};
use crate::options::EdgeDetector;

const SOBEL_V: [i32; 9] = [-1, 0, 1, -2, 0, 2, -1, 0, 1];
const SOBEL_H: [i32; 9] = [-1, -2, -1, 0, 0, 0, 1, 2, 1];
const LAPLACE: [i32; 9] = [1, 1, 1, 1, -8, 1, 1, 1, 1];

/// Per-pixel edge strength of one channel, `0..=255`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl EdgeMap {
    /// Convolve `channel` of `raster` with the 3x3 kernel(s) of `detector`,
    /// wrapping around the image borders.
    pub fn detect(raster: &Raster, channel: Channel, detector: EdgeDetector) -> Self {
        let width = raster.width();
        let height = raster.height();
        let mut data = Vec::with_capacity(width as usize * height as usize);

        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let mut window = [0i32; 9];
                for (i, slot) in window.iter_mut().enumerate() {
                    let dx = (i % 3) as i64 - 1;
                    let dy = (i / 3) as i64 - 1;
                    *slot = raster.get_wrapping(x + dx, y + dy, channel) as i32;
                }
                let strength = match detector {
                    EdgeDetector::Sobel => {
                        let v = convolve(&SOBEL_V, &window) as f64;
                        let h = convolve(&SOBEL_H, &window) as f64;
                        (v * v + h * h).sqrt()
                    }
                    EdgeDetector::Laplacian => convolve(&LAPLACE, &window).abs() as f64,
                };
                data.push(strength.round().clamp(0.0, 255.0) as u8);
            }
        }

        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Strength at a pixel, clamped into the map. An empty map reads 0.
    pub fn strength(&self, x: u32, y: u32) -> u8 {
        if self.data.is_empty() {
            return 0;
        }
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        self.data[y * self.width as usize + x]
    }
}

#[inline]
fn convolve(kernel: &[i32; 9], window: &[i32; 9]) -> i32 {
    kernel.iter().zip(window).map(|(k, v)| k * v).sum()
}
