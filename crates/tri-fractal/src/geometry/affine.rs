//! 2D affine transforms between triangles.

use std::fmt;

use super::{Point, ZERO};
use crate::error::GeometryError;
use crate::fit::PointMap;

/// Row-major 2x3 affine matrix:
///
/// ```text
/// x' = x·m00 + y·m01 + m02
/// y' = x·m10 + y·m11 + m12
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    m00: f64,
    m01: f64,
    m02: f64,
    m10: f64,
    m11: f64,
    m12: f64,
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0);

    pub const fn new(m00: f64, m01: f64, m02: f64, m10: f64, m11: f64, m12: f64) -> Self {
        Self {
            m00,
            m01,
            m02,
            m10,
            m11,
            m12,
        }
    }

    /// Solve for the transform taking `source[i]` onto
    /// `target[map.target_index(i)]` for each vertex `i` (Cramer's rule).
    ///
    /// Fails when the source vertices are collinear.
    pub fn between(
        source: &[Point; 3],
        target: &[Point; 3],
        map: PointMap,
    ) -> Result<Self, GeometryError> {
        let [s0, s1, s2] = *source;
        let d0 = target[map.target_index(0)];
        let d1 = target[map.target_index(1)];
        let d2 = target[map.target_index(2)];

        let det = s0.x * (s1.y - s2.y) + s1.x * (s2.y - s0.y) + s2.x * (s0.y - s1.y);
        if !det.is_finite() || det.abs() < ZERO {
            return Err(GeometryError::NotInvertible { determinant: det });
        }
        let inv = 1.0 / det;

        // Same cofactors for both output rows.
        let cy = [s1.y - s2.y, s2.y - s0.y, s0.y - s1.y];
        let cx = [s2.x - s1.x, s0.x - s2.x, s1.x - s0.x];
        let c1 = [
            s1.x * s2.y - s2.x * s1.y,
            s2.x * s0.y - s0.x * s2.y,
            s0.x * s1.y - s1.x * s0.y,
        ];
        let row = |a: f64, b: f64, c: f64| {
            (
                (a * cy[0] + b * cy[1] + c * cy[2]) * inv,
                (a * cx[0] + b * cx[1] + c * cx[2]) * inv,
                (a * c1[0] + b * c1[1] + c * c1[2]) * inv,
            )
        };
        let (m00, m01, m02) = row(d0.x, d1.x, d2.x);
        let (m10, m11, m12) = row(d0.y, d1.y, d2.y);

        Ok(Self::new(m00, m01, m02, m10, m11, m12))
    }

    #[inline]
    pub fn transform(&self, p: Point) -> Point {
        Point::new(
            p.x * self.m00 + p.y * self.m01 + self.m02,
            p.x * self.m10 + p.y * self.m11 + self.m12,
        )
    }

    /// Determinant of the linear part.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.m00 * self.m11 - self.m01 * self.m10
    }

    pub fn inverse(&self) -> Result<Self, GeometryError> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < ZERO {
            return Err(GeometryError::NotInvertible { determinant: det });
        }
        Ok(Self::new(
            self.m11 / det,
            -self.m01 / det,
            (self.m01 * self.m12 - self.m11 * self.m02) / det,
            -self.m10 / det,
            self.m00 / det,
            (self.m10 * self.m02 - self.m00 * self.m12) / det,
        ))
    }

    /// Map `p` back through the transform without materializing the inverse.
    pub fn inverse_transform(&self, p: Point) -> Result<Point, GeometryError> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < ZERO {
            return Err(GeometryError::NotInvertible { determinant: det });
        }
        let x = p.x - self.m02;
        let y = p.y - self.m12;
        Ok(Point::new(
            (x * self.m11 - y * self.m01) / det,
            (y * self.m00 - x * self.m10) / det,
        ))
    }
}

impl fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[[{},{},{}],[{},{},{}]]",
            self.m00, self.m01, self.m02, self.m10, self.m11, self.m12
        )
    }
}
