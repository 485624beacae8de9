//! Closed-form least-squares fit of `y ≈ s·x + o`.

use crate::options::ErrorMetric;

/// Largest representable brightness offset, in raw channel units.
pub const BRIGHTNESS_LIMIT: f64 = 255.0;

/// Variances below this are treated as zero.
const VARIANCE_FLOOR: f64 = 1e-9;

/// Contrast/brightness pair with its residual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueFit {
    pub saturation: f64,
    pub brightness: f64,
    pub error: f64,
}

/// Fit `range ≈ s·domain + o` over paired samples `(domain, range)`.
///
/// `s` is clamped to `[0, 1]` so that the map is contractive, then `o` is
/// recomputed for the clamped `s` and clamped to
/// `[-BRIGHTNESS_LIMIT, BRIGHTNESS_LIMIT]`. A domain with zero variance
/// yields `s = 0, o = mean(range)`. Returns `None` for an empty sample set.
pub fn fit_values(pairs: &[(f64, f64)], metric: ErrorMetric) -> Option<ValueFit> {
    if pairs.is_empty() {
        return None;
    }
    let n = pairs.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_xy = 0.0;
    for &(x, y) in pairs {
        sum_x += x;
        sum_y += y;
        sum_xx += x * x;
        sum_xy += x * y;
    }

    let denom = n * sum_xx - sum_x * sum_x;
    let saturation = if denom.abs() <= VARIANCE_FLOOR * n * n {
        0.0
    } else {
        ((n * sum_xy - sum_x * sum_y) / denom).clamp(0.0, 1.0)
    };
    let brightness =
        ((sum_y - saturation * sum_x) / n).clamp(-BRIGHTNESS_LIMIT, BRIGHTNESS_LIMIT);

    Some(ValueFit {
        saturation,
        brightness,
        error: residual(pairs, saturation, brightness, metric),
    })
}

/// Fit a constant to `values`: `s = 0`, `o = mean`.
pub fn fit_flat(values: &[f64], metric: ErrorMetric) -> Option<ValueFit> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let error = match metric {
        ErrorMetric::Rms => {
            let sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (sq / values.len() as f64).sqrt()
        }
        ErrorMetric::Supremum => values.iter().map(|v| (v - mean).abs()).fold(0.0, f64::max),
    };
    Some(ValueFit {
        saturation: 0.0,
        brightness: mean,
        error,
    })
}

/// Residual of `s·x + o` against `y` under `metric`.
pub fn residual(pairs: &[(f64, f64)], s: f64, o: f64, metric: ErrorMetric) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    match metric {
        ErrorMetric::Rms => {
            let sq: f64 = pairs
                .iter()
                .map(|&(x, y)| {
                    let d = s * x + o - y;
                    d * d
                })
                .sum();
            (sq / pairs.len() as f64).sqrt()
        }
        ErrorMetric::Supremum => pairs
            .iter()
            .map(|&(x, y)| (s * x + o - y).abs())
            .fold(0.0, f64::max),
    }
}
