//! Encoder and decoder configuration.
//!
//! The small closed enums here select between the alternative strategies the
//! encoder and decoder support. They are dispatched with plain `match` in the
//! functions that use them. Every type deserializes from kebab-case names so
//! applications can load them from configuration files.

use serde::Deserialize;

/// How pixel samples are paired between a source and a destination triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingType {
    /// Iterate the destination's samples and pull each from the source
    /// through the inverse transform.
    #[default]
    Subsample,
    /// Iterate the source's samples and push each to the destination.
    Supersample,
    /// Both of the above.
    Both,
}

/// Where along an edge a triangle is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DivideType {
    /// Always the midpoint.
    Middle,
    /// The strongest edge response along the central part of the edge.
    #[default]
    HighEntropy,
    /// The weakest edge response along the central part of the edge.
    LowEntropy,
}

/// Residual measure for a value fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorMetric {
    /// Root mean square residual.
    #[default]
    Rms,
    /// Largest absolute residual.
    Supremum,
}

/// Convolution used to build the edge-strength map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeDetector {
    #[default]
    Sobel,
    Laplacian,
}

/// Shape of a subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubdivisionMethod {
    /// Four children from one split point on each edge.
    #[default]
    EdgeRatios,
    /// Three children around the centroid.
    Barycentric,
}

/// Largest number of triangles a single tree may hold. Ids are u16 and
/// `0xFFFF` is reserved for "none".
pub const MAX_TREE_TRIANGLES: usize = 0xFFFF;

/// Configuration for encoding.
///
/// # Defaults
///
/// - error cutoff 10.0 (RMS intensity difference)
/// - subsampling, high-entropy splits, RMS metric, Sobel edges
/// - edge-ratio subdivision, split points within `[0.25, 0.75]` of an edge
/// - sources at least twice the destination's area
/// - at most [`MAX_TREE_TRIANGLES`] triangles, at least 6 samples before a
///   triangle is force-accepted
///
/// # Example
///
/// ```
/// use tri_fractal::{DivideType, EncoderOptions, ErrorMetric};
///
/// let options = EncoderOptions::new()
///     .error_cutoff(6.0)
///     .divide(DivideType::Middle)
///     .metric(ErrorMetric::Supremum);
/// assert_eq!(options.error_cutoff, 6.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EncoderOptions {
    /// Fits with an error below this are accepted.
    pub error_cutoff: f64,
    pub sampling: SamplingType,
    pub divide: DivideType,
    pub metric: ErrorMetric,
    pub edge_detector: EdgeDetector,
    pub subdivision: SubdivisionMethod,
    /// Split points stay within `[ratio, 1 - ratio]` along an edge.
    pub min_subdivide_ratio: f64,
    /// A candidate source must be at least this many times larger (by area).
    pub min_search_ratio: f64,
    /// Hard cap on triangles per tree; reaching it forces acceptance.
    /// The roots are split regardless, so a tree holds at least 10.
    pub max_triangles: usize,
    /// Triangles with fewer samples are accepted instead of subdivided.
    pub min_samples: usize,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            error_cutoff: 10.0,
            sampling: SamplingType::default(),
            divide: DivideType::default(),
            metric: ErrorMetric::default(),
            edge_detector: EdgeDetector::default(),
            subdivision: SubdivisionMethod::default(),
            min_subdivide_ratio: 0.25,
            min_search_ratio: 2.0,
            max_triangles: MAX_TREE_TRIANGLES,
            min_samples: 6,
        }
    }
}

impl EncoderOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn error_cutoff(mut self, cutoff: f64) -> Self {
        self.error_cutoff = cutoff;
        self
    }

    #[inline]
    pub fn sampling(mut self, sampling: SamplingType) -> Self {
        self.sampling = sampling;
        self
    }

    #[inline]
    pub fn divide(mut self, divide: DivideType) -> Self {
        self.divide = divide;
        self
    }

    #[inline]
    pub fn metric(mut self, metric: ErrorMetric) -> Self {
        self.metric = metric;
        self
    }

    #[inline]
    pub fn edge_detector(mut self, detector: EdgeDetector) -> Self {
        self.edge_detector = detector;
        self
    }

    #[inline]
    pub fn subdivision(mut self, method: SubdivisionMethod) -> Self {
        self.subdivision = method;
        self
    }

    #[inline]
    pub fn min_subdivide_ratio(mut self, ratio: f64) -> Self {
        self.min_subdivide_ratio = ratio;
        self
    }

    #[inline]
    pub fn min_search_ratio(mut self, ratio: f64) -> Self {
        self.min_search_ratio = ratio;
        self
    }

    /// Set the triangle cap. Values above [`MAX_TREE_TRIANGLES`] are clamped.
    #[inline]
    pub fn max_triangles(mut self, max: usize) -> Self {
        self.max_triangles = max.min(MAX_TREE_TRIANGLES);
        self
    }

    #[inline]
    pub fn min_samples(mut self, min: usize) -> Self {
        self.min_samples = min;
        self
    }

    /// Triangle cap after applying the format limit.
    #[inline]
    pub(crate) fn triangle_cap(&self) -> usize {
        self.max_triangles.min(MAX_TREE_TRIANGLES)
    }

    /// Split ratio bound, kept inside `[0, 0.5]`.
    #[inline]
    pub(crate) fn subdivide_ratio_bound(&self) -> f64 {
        self.min_subdivide_ratio.clamp(0.0, 0.5)
    }
}

/// Configuration for decoding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DecoderOptions {
    /// Number of attractor iterations.
    pub iterations: usize,
    pub sampling: SamplingType,
    /// Output width; `None` uses the encoded image's width.
    pub width: Option<u32>,
    /// Output height; `None` uses the encoded image's height.
    pub height: Option<u32>,
    /// Fill pixels no sample reached from their painted neighbours.
    pub fix_errors: bool,
    /// Grey level of the initial image.
    pub seed: u8,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            iterations: 20,
            sampling: SamplingType::default(),
            width: None,
            height: None,
            fix_errors: false,
            seed: 128,
        }
    }
}

impl DecoderOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[inline]
    pub fn sampling(mut self, sampling: SamplingType) -> Self {
        self.sampling = sampling;
        self
    }

    #[inline]
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[inline]
    pub fn fix_errors(mut self, enabled: bool) -> Self {
        self.fix_errors = enabled;
        self
    }

    #[inline]
    pub fn seed(mut self, grey: u8) -> Self {
        self.seed = grey;
        self
    }
}
