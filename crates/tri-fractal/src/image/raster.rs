//! 8-bit pixel buffers.

/// A colour channel of a [`Raster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Luminance: the only channel of a grey raster, the mean of red, green
    /// and blue on a colour raster.
    Grey,
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const RGB: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];
}

/// Grey (1 sample per pixel) or RGB (3 interleaved samples per pixel)
/// image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    samples_per_pixel: usize,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap grey samples.
    ///
    /// # Panics (debug only)
    ///
    /// Debug-asserts that `data.len() == width * height`.
    pub fn from_grey(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            width,
            height,
            samples_per_pixel: 1,
            data,
        }
    }

    /// Wrap interleaved RGB samples.
    ///
    /// # Panics (debug only)
    ///
    /// Debug-asserts that `data.len() == width * height * 3`.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * 3);
        Self {
            width,
            height,
            samples_per_pixel: 3,
            data,
        }
    }

    /// Uniform raster with every sample set to `value`.
    pub fn filled(width: u32, height: u32, color: bool, value: u8) -> Self {
        let spp = if color { 3 } else { 1 };
        Self {
            width,
            height,
            samples_per_pixel: spp,
            data: vec![value; width as usize * height as usize * spp],
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

    #[inline]
    pub fn is_color(&self) -> bool {
        self.samples_per_pixel == 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw samples, row-major, interleaved for RGB.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Sample offset of `channel` within a pixel; `None` means "average of
    /// all three" (grey read from an RGB raster).
    #[inline]
    fn offset(&self, channel: Channel) -> Option<usize> {
        if self.samples_per_pixel == 1 {
            return Some(0);
        }
        match channel {
            Channel::Grey => None,
            Channel::Red => Some(0),
            Channel::Green => Some(1),
            Channel::Blue => Some(2),
        }
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.samples_per_pixel
    }

    /// Read with strict addressing: coordinates are clamped into the image.
    /// An empty raster reads as 0.
    pub fn get(&self, x: i64, y: i64, channel: Channel) -> u8 {
        if self.is_empty() {
            return 0;
        }
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        let base = self.pixel_index(x, y);
        match self.offset(channel) {
            Some(off) => self.data[base + off],
            None => {
                let sum: u32 = self.data[base..base + 3].iter().map(|&v| v as u32).sum();
                (sum / 3) as u8
            }
        }
    }

    /// Read with wraparound addressing: coordinates one image-size out of
    /// range wrap to the opposite side.
    pub fn get_wrapping(&self, x: i64, y: i64, channel: Channel) -> u8 {
        let w = self.width as i64;
        let h = self.height as i64;
        let x = if x < 0 {
            x + w
        } else if x >= w {
            x - w
        } else {
            x
        };
        let y = if y < 0 {
            y + h
        } else if y >= h {
            y - h
        } else {
            y
        };
        self.get(x, y, channel)
    }

    /// Write one sample. Grey on an RGB raster writes all three; writes
    /// outside the image are ignored.
    pub fn set(&mut self, x: u32, y: u32, channel: Channel, value: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let base = self.pixel_index(x, y);
        match self.offset(channel) {
            Some(off) => self.data[base + off] = value,
            None => self.data[base..base + 3].fill(value),
        }
    }

    /// Bilinear resample to `width` x `height`, as grey or RGB.
    pub fn resampled(&self, width: u32, height: u32, color: bool) -> Raster {
        let mut out = Raster::filled(width, height, color, 0);
        let channels: &[Channel] = if color { &Channel::RGB } else { &[Channel::Grey] };
        let fx = self.width as f64 / width.max(1) as f64;
        let fy = self.height as f64 / height.max(1) as f64;
        for y in 0..height {
            let sy = ((y as f64 + 0.5) * fy - 0.5).max(0.0);
            let y0 = sy.floor();
            let ty = sy - y0;
            for x in 0..width {
                let sx = ((x as f64 + 0.5) * fx - 0.5).max(0.0);
                let x0 = sx.floor();
                let tx = sx - x0;
                for &channel in channels {
                    let at = |dx: i64, dy: i64| {
                        self.get(x0 as i64 + dx, y0 as i64 + dy, channel) as f64
                    };
                    let top = at(0, 0) * (1.0 - tx) + at(1, 0) * tx;
                    let bottom = at(0, 1) * (1.0 - tx) + at(1, 1) * tx;
                    let value = top * (1.0 - ty) + bottom * ty;
                    out.set(x, y, channel, value.round().clamp(0.0, 255.0) as u8);
                }
            }
        }
        out
    }
}
