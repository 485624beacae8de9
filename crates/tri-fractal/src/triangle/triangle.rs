//! A single node of the triangle forest.

use std::fmt;

use crate::error::GeometryError;
use crate::fit::TriFit;
use crate::geometry::{AffineTransform, Bounds, Point};

/// Stable handle of a triangle inside its tree.
///
/// The handle doubles as the triangle's wire id: it is the index into the
/// tree's arena. `0xFFFF` is reserved on the wire for "no triangle".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriangleId(u16);

impl TriangleId {
    /// Wire value meaning "no triangle".
    pub const WIRE_NONE: u16 = 0xFFFF;

    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Encode an optional handle for the wire.
    #[inline]
    pub fn to_wire(id: Option<TriangleId>) -> u16 {
        id.map_or(Self::WIRE_NONE, TriangleId::raw)
    }

    /// Decode a wire value; `0xFFFF` becomes `None`.
    #[inline]
    pub fn from_wire(raw: u16) -> Option<TriangleId> {
        (raw != Self::WIRE_NONE).then_some(TriangleId(raw))
    }
}

impl fmt::Display for TriangleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One triangle of the forest.
///
/// Links to the parent, the neighbouring siblings and the children are
/// handles into the owning [`Forest`](super::Forest). The sibling links form
/// a chain per depth that crosses parent boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub(crate) id: TriangleId,
    pub(crate) points: [Point; 3],
    pub(crate) parent: Option<TriangleId>,
    pub(crate) prev_sibling: Option<TriangleId>,
    pub(crate) next_sibling: Option<TriangleId>,
    pub(crate) children: Vec<TriangleId>,
    pub(crate) target: Option<TriFit>,
}

impl Triangle {
    pub(crate) fn new(id: TriangleId, points: [Point; 3]) -> Self {
        Self {
            id,
            points,
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            children: Vec::new(),
            target: None,
        }
    }

    #[inline]
    pub fn id(&self) -> TriangleId {
        self.id
    }

    #[inline]
    pub fn points(&self) -> &[Point; 3] {
        &self.points
    }

    #[inline]
    pub fn parent(&self) -> Option<TriangleId> {
        self.parent
    }

    #[inline]
    pub fn prev_sibling(&self) -> Option<TriangleId> {
        self.prev_sibling
    }

    #[inline]
    pub fn next_sibling(&self) -> Option<TriangleId> {
        self.next_sibling
    }

    #[inline]
    pub fn children(&self) -> &[TriangleId] {
        &self.children
    }

    /// A triangle is terminal exactly when it has no children.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// The fitted code, once the triangle has been accepted.
    #[inline]
    pub fn target(&self) -> Option<&TriFit> {
        self.target.as_ref()
    }

    pub(crate) fn set_target(&mut self, fit: TriFit) {
        self.target = Some(fit);
    }

    pub fn area(&self) -> f64 {
        let [a, b, c] = self.points;
        (b - a).cross(c - a).abs() / 2.0
    }

    pub fn bounding_box(&self) -> Bounds {
        let [a, b, c] = self.points;
        let mut bounds = Bounds { min: a, max: a };
        for p in [b, c] {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        bounds
    }

    pub fn centroid(&self) -> Point {
        let [a, b, c] = self.points;
        Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
    }

    /// Barycentric inside test, exclusive of the boundary.
    ///
    /// With `u` the weight of vertex 2 and `v` the weight of vertex 1, a
    /// point is inside iff `u > 0`, `v > 0` and `u + v < 1`. Points on an
    /// edge or vertex are outside, and a degenerate triangle contains
    /// nothing.
    pub fn contains(&self, p: Point) -> bool {
        let [a, b, c] = self.points;
        let v0 = c - a;
        let v1 = b - a;
        let v2 = p - a;

        let dot00 = v0.dot(v0);
        let dot01 = v0.dot(v1);
        let dot02 = v0.dot(v2);
        let dot11 = v1.dot(v1);
        let dot12 = v1.dot(v2);

        let denom = dot00 * dot11 - dot01 * dot01;
        if denom.abs() < f64::EPSILON * dot00.max(dot11).max(1e-300) {
            return false;
        }
        let u = (dot11 * dot02 - dot01 * dot12) / denom;
        let v = (dot00 * dot12 - dot01 * dot02) / denom;
        u > 0.0 && v > 0.0 && u + v < 1.0
    }

    /// Transform from `source`'s vertices onto this triangle's, under the
    /// point map stored in this triangle's fit.
    pub fn transform_from(&self, source: &Triangle) -> Result<AffineTransform, GeometryError> {
        let map = self.target.map(|t| t.point_map).unwrap_or_default();
        AffineTransform::between(&source.points, &self.points, map)
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.points;
        write!(f, "{} [{a}, {b}, {c}]", self.id)?;
        match &self.target {
            Some(fit) => write!(f, " {fit}"),
            None if !self.children.is_empty() => {
                write!(f, " -> {} children", self.children.len())
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::{PointMap, ValueFit};

    fn unit_lower() -> Triangle {
        Triangle::new(
            TriangleId::new(0),
            [
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
            ],
        )
    }

    #[test]
    fn test_area_and_bounds() {
        let t = unit_lower();
        assert!((t.area() - 0.5).abs() < 1e-12);
        let b = t.bounding_box();
        assert_eq!(b.min, Point::new(0.0, 0.0));
        assert_eq!(b.max, Point::new(1.0, 1.0));
    }

    #[test]
    fn test_contains_is_exclusive_of_boundary() {
        let t = unit_lower();
        assert!(t.contains(Point::new(0.75, 0.25)));
        assert!(!t.contains(Point::new(0.25, 0.75)));
        // Vertices and edge points are outside.
        assert!(!t.contains(Point::new(0.0, 0.0)));
        assert!(!t.contains(Point::new(0.5, 0.0)));
        assert!(!t.contains(Point::new(0.5, 0.5)));
    }

    #[test]
    fn test_degenerate_contains_nothing() {
        let t = Triangle::new(
            TriangleId::new(0),
            [
                Point::new(0.0, 0.0),
                Point::new(0.5, 0.5),
                Point::new(1.0, 1.0),
            ],
        );
        assert!(!t.contains(Point::new(0.5, 0.5)));
        assert!(!t.contains(Point::new(0.25, 0.3)));
        assert_eq!(t.area(), 0.0);
    }

    #[test]
    fn test_centroid() {
        let c = unit_lower().centroid();
        assert!(c.approx_eq(Point::new(2.0 / 3.0, 1.0 / 3.0), 1e-12));
    }

    #[test]
    fn test_wire_ids() {
        assert_eq!(TriangleId::to_wire(None), 0xFFFF);
        assert_eq!(TriangleId::to_wire(Some(TriangleId::new(7))), 7);
        assert_eq!(TriangleId::from_wire(0xFFFF), None);
        assert_eq!(TriangleId::from_wire(3), Some(TriangleId::new(3)));
    }

    #[test]
    fn test_transform_from_uses_stored_point_map() {
        let source = unit_lower();
        let mut dest = Triangle::new(
            TriangleId::new(1),
            [
                Point::new(0.0, 0.0),
                Point::new(0.5, 0.0),
                Point::new(0.5, 0.5),
            ],
        );
        dest.set_target(TriFit::mapped(
            source.id(),
            PointMap::P210,
            ValueFit {
                saturation: 1.0,
                brightness: 0.0,
                error: 0.0,
            },
        ));
        let t = dest.transform_from(&source).unwrap();
        assert!(t
            .transform(source.points()[0])
            .approx_eq(dest.points()[2], 1e-12));
        assert!(t
            .transform(source.points()[2])
            .approx_eq(dest.points()[0], 1e-12));
    }
}
