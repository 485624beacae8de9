//! One channel of a raster seen through normalized coordinates.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Canvas, Channel, EdgeMap, Raster};
use crate::error::GeometryError;
use crate::fit::{fit_flat, fit_values, PointMap, TriFit};
use crate::geometry::{AffineTransform, Point};
use crate::options::{DivideType, EncoderOptions, SamplingType};
use crate::triangle::{Forest, Triangle, TriangleId};

/// A single channel of a [`Raster`] addressed in `[0, 1]²`.
///
/// Unit coordinates map onto pixel `round(u * (size - 1))`, clamped into
/// the image. The image caches the sample points of each triangle it has
/// been asked about, keyed by [`TriangleId`], so one `DoubleImage` must only
/// ever be used with triangles of a single [`Forest`].
#[derive(Debug, Clone)]
pub struct DoubleImage {
    raster: Arc<Raster>,
    channel: Channel,
    options: EncoderOptions,
    edges: OnceCell<EdgeMap>,
    samples: HashMap<TriangleId, Arc<[Point]>>,
}

impl DoubleImage {
    pub fn new(raster: Arc<Raster>, channel: Channel, options: EncoderOptions) -> Self {
        Self {
            raster,
            channel,
            options,
            edges: OnceCell::new(),
            samples: HashMap::new(),
        }
    }

    /// Swap the underlying pixels. Cached sample points survive when the
    /// dimensions are unchanged; the edge map is rebuilt on next use.
    pub fn set_raster(&mut self, raster: Arc<Raster>) {
        if raster.width() != self.raster.width() || raster.height() != self.raster.height() {
            self.samples.clear();
        }
        self.raster = raster;
        self.edges = OnceCell::new();
    }

    pub fn set_sampling(&mut self, sampling: SamplingType) {
        self.options.sampling = sampling;
    }

    #[inline]
    pub fn raster(&self) -> &Arc<Raster> {
        &self.raster
    }

    #[inline]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    #[inline]
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    #[inline]
    fn scale_x(&self) -> f64 {
        self.width().saturating_sub(1).max(1) as f64
    }

    #[inline]
    fn scale_y(&self) -> f64 {
        self.height().saturating_sub(1).max(1) as f64
    }

    /// Pixel holding the unit-space point `p`.
    pub fn to_pixel(&self, p: Point) -> (u32, u32) {
        let max_x = self.width().saturating_sub(1) as f64;
        let max_y = self.height().saturating_sub(1) as f64;
        let x = (p.x * self.scale_x()).round().clamp(0.0, max_x);
        let y = (p.y * self.scale_y()).round().clamp(0.0, max_y);
        (x as u32, y as u32)
    }

    /// Intensity at `p`, `0.0..=255.0`.
    pub fn value_at(&self, p: Point) -> f64 {
        let (x, y) = self.to_pixel(p);
        self.raster.get(x as i64, y as i64, self.channel) as f64
    }

    /// Sample points of `tri`: every pixel-grid point strictly inside it,
    /// plus points stepped along each edge at pixel resolution (each vertex
    /// exactly once).
    pub fn points_inside(&mut self, tri: &Triangle) -> Arc<[Point]> {
        if let Some(points) = self.samples.get(&tri.id()) {
            return Arc::clone(points);
        }
        let points: Arc<[Point]> = self.scan_points(tri).into();
        self.samples.insert(tri.id(), Arc::clone(&points));
        points
    }

    fn scan_points(&self, tri: &Triangle) -> Vec<Point> {
        let sx = self.scale_x();
        let sy = self.scale_y();
        let bounds = tri.bounding_box();
        let col_lo = (bounds.min.x * sx).ceil().max(0.0) as i64;
        let col_hi = (bounds.max.x * sx).floor().min(sx) as i64;
        let row_lo = (bounds.min.y * sy).ceil().max(0.0) as i64;
        let row_hi = (bounds.max.y * sy).floor().min(sy) as i64;

        let mut points = Vec::new();
        for col in col_lo..=col_hi {
            let x = col as f64 / sx;
            let at = |row: i64| Point::new(x, row as f64 / sy);
            let Some(top) = (row_lo..=row_hi).find(|&r| tri.contains(at(r))) else {
                continue;
            };
            let bottom = (top..=row_hi)
                .rev()
                .find(|&r| tri.contains(at(r)))
                .unwrap_or(top);
            points.extend((top..=bottom).map(at));
        }

        let [a, b, c] = *tri.points();
        for (from, to) in [(a, b), (b, c), (c, a)] {
            let d = to - from;
            let steps = (d.dx.abs() * sx)
                .max(d.dy.abs() * sy)
                .ceil()
                .max(1.0) as usize;
            points.extend((0..steps).map(|k| from.lerp(to, k as f64 / steps as f64)));
        }
        points
    }

    /// Paired `(source, destination)` intensities for mapping `larger` onto
    /// `smaller` under `map`, per the configured sampling.
    fn sample_pairs(
        &mut self,
        smaller: &Triangle,
        larger: &Triangle,
        map: PointMap,
    ) -> Result<Vec<(f64, f64)>, GeometryError> {
        let forward = AffineTransform::between(larger.points(), smaller.points(), map)?;
        let mut pairs = Vec::new();
        if matches!(
            self.options.sampling,
            SamplingType::Subsample | SamplingType::Both
        ) {
            let inverse = forward.inverse()?;
            let points = self.points_inside(smaller);
            pairs.extend(
                points
                    .iter()
                    .map(|&q| (self.value_at(inverse.transform(q)), self.value_at(q))),
            );
        }
        if matches!(
            self.options.sampling,
            SamplingType::Supersample | SamplingType::Both
        ) {
            let points = self.points_inside(larger);
            pairs.extend(
                points
                    .iter()
                    .map(|&p| (self.value_at(p), self.value_at(forward.transform(p)))),
            );
        }
        Ok(pairs)
    }

    /// Best of the six vertex correspondences from `larger` onto `smaller`.
    ///
    /// Returns [`TriFit::NONE`] when every correspondence is degenerate or
    /// yields no samples.
    pub fn optimal_fit(&mut self, smaller: &Triangle, larger: &Triangle) -> TriFit {
        let mut best = TriFit::NONE;
        for map in PointMap::PERMUTATIONS {
            let pairs = match self.sample_pairs(smaller, larger, map) {
                Ok(pairs) => pairs,
                Err(e) => {
                    tracing::trace!(
                        smaller = %smaller.id(),
                        larger = %larger.id(),
                        %map,
                        error = %e,
                        "Skipping degenerate mapping"
                    );
                    continue;
                }
            };
            let Some(fit) = fit_values(&pairs, self.options.metric) else {
                continue;
            };
            let candidate = TriFit::mapped(larger.id(), map, fit);
            if candidate.beats(&best) {
                best = candidate;
            }
        }
        best
    }

    /// Lowest-error fit of `dest` against the qualifying `candidates`.
    ///
    /// A candidate qualifies when its area is at least `min_search_ratio`
    /// times that of `dest`. Returns [`TriFit::NONE`] when none qualifies.
    pub fn best_match(
        &mut self,
        forest: &Forest,
        dest: TriangleId,
        candidates: &[TriangleId],
    ) -> TriFit {
        let smaller = forest.get(dest);
        let min_area = smaller.area() * self.options.min_search_ratio;
        let mut best = TriFit::NONE;
        for &id in candidates {
            if id == dest {
                continue;
            }
            let larger = forest.get(id);
            if larger.area() < min_area {
                continue;
            }
            let fit = self.optimal_fit(smaller, larger);
            if fit.beats(&best) {
                best = fit;
            }
        }
        best
    }

    /// Constant fill at the mean intensity of `tri`.
    pub fn flat_fit(&mut self, tri: &Triangle) -> TriFit {
        let points = self.points_inside(tri);
        let values: Vec<f64> = points.iter().map(|&p| self.value_at(p)).collect();
        match fit_flat(&values, self.options.metric) {
            Some(fit) => TriFit::flat(fit),
            None => TriFit::NONE,
        }
    }

    fn edges(&self) -> &EdgeMap {
        self.edges.get_or_init(|| {
            tracing::debug!(
                channel = ?self.channel,
                detector = ?self.options.edge_detector,
                "Building edge map"
            );
            EdgeMap::detect(&self.raster, self.channel, self.options.edge_detector)
        })
    }

    /// Fraction along `from -> to` at which to split that edge.
    ///
    /// Candidates lie in `[r, 1 - r]` for the configured minimum ratio `r`,
    /// one per pixel step. High entropy picks the strongest edge response,
    /// low entropy the weakest; ties go to the candidate nearest the
    /// midpoint. Falls back to 0.5 when there is nothing to scan.
    pub fn best_divide(&self, from: Point, to: Point) -> f64 {
        let pick_max = match self.options.divide {
            DivideType::Middle => return 0.5,
            DivideType::HighEntropy => true,
            DivideType::LowEntropy => false,
        };
        let lo = self.options.subdivide_ratio_bound();
        let hi = 1.0 - lo;
        let d = to - from;
        let pixels = (d.dx.abs() * self.scale_x()).max(d.dy.abs() * self.scale_y());
        let steps = (pixels * (hi - lo)).ceil() as usize;
        if hi <= lo || steps == 0 || self.raster.is_empty() {
            return 0.5;
        }

        let edges = self.edges();
        let mut best: Option<(u8, f64)> = None;
        for k in 0..=steps {
            let ratio = lo + (hi - lo) * k as f64 / steps as f64;
            let (x, y) = self.to_pixel(from.lerp(to, ratio));
            let strength = edges.strength(x, y);
            let better = match best {
                None => true,
                Some((s, r)) if s == strength => (ratio - 0.5).abs() < (r - 0.5).abs(),
                Some((s, _)) => (strength > s) == pick_max,
            };
            if better {
                best = Some((strength, ratio));
            }
        }
        best.map_or(0.5, |(_, r)| r)
    }

    /// Render the fitted code of `dest` into `canvas`.
    ///
    /// Flat fits paint their brightness over `dest`'s samples. Mapped fits
    /// read this image through the transform from `source` onto `dest` and
    /// apply the value map.
    pub fn paint(
        &mut self,
        dest: &Triangle,
        source: Option<&Triangle>,
        canvas: &mut Canvas,
    ) -> Result<(), GeometryError> {
        let Some(fit) = dest.target().copied() else {
            return Ok(());
        };
        let channel = self.channel;
        if fit.is_flat() {
            let points = self.points_inside(dest);
            for &q in points.iter() {
                let (x, y) = self.to_pixel(q);
                canvas.paint(x, y, channel, fit.brightness);
            }
            return Ok(());
        }
        let Some(source) = source else {
            return Ok(());
        };

        let forward = dest.transform_from(source)?;
        if matches!(
            self.options.sampling,
            SamplingType::Subsample | SamplingType::Both
        ) {
            let inverse = forward.inverse()?;
            let points = self.points_inside(dest);
            for &q in points.iter() {
                let value = fit.apply(self.value_at(inverse.transform(q)));
                let (x, y) = self.to_pixel(q);
                canvas.paint(x, y, channel, value);
            }
        }
        if matches!(
            self.options.sampling,
            SamplingType::Supersample | SamplingType::Both
        ) {
            let points = self.points_inside(source);
            for &p in points.iter() {
                let value = fit.apply(self.value_at(p));
                let (x, y) = self.to_pixel(forward.transform(p));
                canvas.paint(x, y, channel, value);
            }
        }
        Ok(())
    }
}
