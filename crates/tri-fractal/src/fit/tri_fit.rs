//! The fractal code stored on a terminal triangle.

use std::fmt;

use super::{PointMap, ValueFit};
use crate::triangle::TriangleId;

/// Result of fitting one triangle against a larger source triangle.
///
/// A fit with `source == None` and [`PointMap::Unmapped`] is a flat fill:
/// decoding paints `brightness` directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriFit {
    pub point_map: PointMap,
    /// Contrast scale `s`.
    pub saturation: f64,
    /// Offset `o`.
    pub brightness: f64,
    /// Residual under the active metric; negative for "no fit".
    pub error: f64,
    /// The matched (larger) triangle.
    pub source: Option<TriangleId>,
}

impl TriFit {
    /// Sentinel returned when no candidate qualified.
    pub const NONE: TriFit = TriFit {
        point_map: PointMap::Unmapped,
        saturation: 0.0,
        brightness: 0.0,
        error: -1.0,
        source: None,
    };

    pub fn mapped(source: TriangleId, point_map: PointMap, fit: ValueFit) -> Self {
        Self {
            point_map,
            saturation: fit.saturation,
            brightness: fit.brightness,
            error: fit.error,
            source: Some(source),
        }
    }

    pub fn flat(fit: ValueFit) -> Self {
        Self {
            point_map: PointMap::Unmapped,
            saturation: 0.0,
            brightness: fit.brightness,
            error: fit.error,
            source: None,
        }
    }

    /// True when this is a real fit (non-negative error).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.error >= 0.0
    }

    #[inline]
    pub fn is_flat(&self) -> bool {
        self.source.is_none() || self.point_map.is_unmapped()
    }

    /// Apply the value map to a source intensity.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        value * self.saturation + self.brightness
    }

    /// True when `self` should replace `best` in a minimum-error search.
    #[inline]
    pub fn beats(&self, best: &TriFit) -> bool {
        self.is_valid() && (!best.is_valid() || self.error < best.error)
    }
}

impl Default for TriFit {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for TriFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Some(src) => write!(
                f,
                "src={} map={} s={:.4} o={:.2} err={:.3}",
                src, self.point_map, self.saturation, self.brightness, self.error
            ),
            None => write!(f, "flat o={:.2} err={:.3}", self.brightness, self.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(error: f64) -> TriFit {
        TriFit {
            error,
            ..TriFit::mapped(
                TriangleId::new(1),
                PointMap::P012,
                ValueFit {
                    saturation: 0.5,
                    brightness: 10.0,
                    error,
                },
            )
        }
    }

    #[test]
    fn test_none_sentinel_is_invalid() {
        assert!(!TriFit::NONE.is_valid());
        assert!(TriFit::NONE.is_flat());
        assert_eq!(TriFit::default(), TriFit::NONE);
    }

    #[test]
    fn test_beats_prefers_any_valid_over_none() {
        assert!(fit(100.0).beats(&TriFit::NONE));
        assert!(!TriFit::NONE.beats(&fit(100.0)));
    }

    #[test]
    fn test_beats_is_strict() {
        assert!(fit(1.0).beats(&fit(2.0)));
        assert!(!fit(2.0).beats(&fit(2.0)));
    }

    #[test]
    fn test_apply() {
        assert_eq!(fit(0.0).apply(100.0), 60.0);
    }
}
