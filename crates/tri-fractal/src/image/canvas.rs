//! Accumulation buffer for one decode iteration.

use super::{Channel, Raster};

/// Running per-sample average of every value painted during one iteration.
///
/// Hit counts are kept separately from the image so that the final values
/// do not depend on the order in which triangles are painted.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    samples_per_pixel: usize,
    values: Vec<f64>,
    hits: Vec<u32>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, color: bool) -> Self {
        let spp = if color { 3 } else { 1 };
        let len = width as usize * height as usize * spp;
        Self {
            width,
            height,
            samples_per_pixel: spp,
            values: vec![0.0; len],
            hits: vec![0; len],
        }
    }

    /// Canvas matching the dimensions and layout of `raster`.
    pub fn like(raster: &Raster) -> Self {
        Self::new(raster.width(), raster.height(), raster.is_color())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    fn offsets(&self, channel: Channel) -> std::ops::Range<usize> {
        if self.samples_per_pixel == 1 {
            return 0..1;
        }
        match channel {
            Channel::Grey => 0..3,
            Channel::Red => 0..1,
            Channel::Green => 1..2,
            Channel::Blue => 2..3,
        }
    }

    /// Fold `value` into the running average at `(x, y)`. Grey on a colour
    /// canvas paints all three channels.
    pub fn paint(&mut self, x: u32, y: u32, channel: Channel, value: f64) {
        if x >= self.width || y >= self.height {
            return;
        }
        let base = (y as usize * self.width as usize + x as usize) * self.samples_per_pixel;
        for off in self.offsets(channel) {
            let i = base + off;
            self.hits[i] += 1;
            self.values[i] += (value - self.values[i]) / self.hits[i] as f64;
        }
    }

    /// Number of samples that reached `(x, y)` on `channel`.
    pub fn hits(&self, x: u32, y: u32, channel: Channel) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let base = (y as usize * self.width as usize + x as usize) * self.samples_per_pixel;
        self.offsets(channel)
            .map(|off| self.hits[base + off])
            .min()
            .unwrap_or(0)
    }

    /// Turn the averages into a raster.
    ///
    /// Samples nobody painted keep their value from `previous`, or, with
    /// `fix_errors`, take the mean of their painted 8-neighbours when there
    /// are any.
    pub fn resolve(&self, previous: &Raster, fix_errors: bool) -> Raster {
        let spp = self.samples_per_pixel;
        let mut out = Vec::with_capacity(self.values.len());
        for y in 0..self.height {
            for x in 0..self.width {
                let base = (y as usize * self.width as usize + x as usize) * spp;
                for off in 0..spp {
                    let i = base + off;
                    let value = if self.hits[i] > 0 {
                        self.values[i]
                    } else {
                        let neighbours = if fix_errors {
                            self.neighbour_mean(x, y, off)
                        } else {
                            None
                        };
                        neighbours.unwrap_or_else(|| {
                            previous.get(x as i64, y as i64, channel_at(spp, off)) as f64
                        })
                    };
                    out.push(value.round().clamp(0.0, 255.0) as u8);
                }
            }
        }
        if spp == 3 {
            Raster::from_rgb(self.width, self.height, out)
        } else {
            Raster::from_grey(self.width, self.height, out)
        }
    }

    fn neighbour_mean(&self, x: u32, y: u32, off: usize) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0u32;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                    continue;
                }
                let i = (ny as usize * self.width as usize + nx as usize) * self.samples_per_pixel
                    + off;
                if self.hits[i] > 0 {
                    sum += self.values[i];
                    count += 1;
                }
            }
        }
        (count > 0).then(|| sum / count as f64)
    }
}

fn channel_at(samples_per_pixel: usize, offset: usize) -> Channel {
    if samples_per_pixel == 1 {
        return Channel::Grey;
    }
    Channel::RGB[offset]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_averages_hits() {
        let mut canvas = Canvas::new(2, 1, false);
        canvas.paint(0, 0, Channel::Grey, 10.0);
        canvas.paint(0, 0, Channel::Grey, 20.0);
        canvas.paint(0, 0, Channel::Grey, 60.0);
        assert_eq!(canvas.hits(0, 0, Channel::Grey), 3);
        let raster = canvas.resolve(&Raster::filled(2, 1, false, 5), false);
        assert_eq!(raster.data(), &[30, 5]);
    }

    #[test]
    fn test_paint_order_does_not_matter() {
        let values = [3.0, 250.0, 17.0, 99.0];
        let mut forward = Canvas::new(1, 1, false);
        let mut backward = Canvas::new(1, 1, false);
        for &v in &values {
            forward.paint(0, 0, Channel::Grey, v);
        }
        for &v in values.iter().rev() {
            backward.paint(0, 0, Channel::Grey, v);
        }
        let prev = Raster::filled(1, 1, false, 0);
        assert_eq!(forward.resolve(&prev, false), backward.resolve(&prev, false));
    }

    #[test]
    fn test_fix_errors_fills_from_neighbours() {
        let mut canvas = Canvas::new(3, 1, false);
        canvas.paint(0, 0, Channel::Grey, 100.0);
        canvas.paint(2, 0, Channel::Grey, 200.0);
        let prev = Raster::filled(3, 1, false, 7);
        assert_eq!(canvas.resolve(&prev, false).data(), &[100, 7, 200]);
        assert_eq!(canvas.resolve(&prev, true).data(), &[100, 150, 200]);
    }

    #[test]
    fn test_isolated_gap_keeps_previous_even_when_fixing() {
        let canvas = Canvas::new(2, 2, false);
        let prev = Raster::from_grey(2, 2, vec![1, 2, 3, 4]);
        assert_eq!(canvas.resolve(&prev, true).data(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_color_channels_are_independent() {
        let mut canvas = Canvas::new(1, 1, true);
        canvas.paint(0, 0, Channel::Green, 40.0);
        assert_eq!(canvas.hits(0, 0, Channel::Grey), 0);
        let prev = Raster::from_rgb(1, 1, vec![9, 9, 9]);
        assert_eq!(canvas.resolve(&prev, false).data(), &[9, 40, 9]);
        canvas.paint(0, 0, Channel::Grey, 300.0);
        assert_eq!(canvas.resolve(&prev, false).data(), &[255, 170, 255]);
    }
}
