//! Arena holding every triangle of one tree.
//!
//! Triangles are stored in creation order and addressed by [`TriangleId`],
//! which is also the index into the arena. Nothing is ever removed, so
//! handles stay valid for the lifetime of the forest.
//!
//! # Sibling chains
//!
//! Every depth of the forest is threaded into a single chain through
//! `prev_sibling` / `next_sibling`. When a triangle is subdivided, its
//! children are chained in order and the chain's ends are spliced onto the
//! nearest already-subdivided neighbours of the parent, so the chain at the
//! children's depth crosses parent boundaries:
//!
//! ```text
//! depth 0:   A ─────────── B ─────────── C
//!            │                           │
//! depth 1:  a0─a1─a2─a3 ──────────────── c0─c1─c2─c3
//! ```
//!
//! Above, `B` has not been subdivided yet, so `a3` links straight to `c0`.
//! When `B` is later subdivided its children are spliced in between.

use super::{Triangle, TriangleId};
use crate::geometry::Point;
use crate::options::MAX_TREE_TRIANGLES;

/// All triangles of one tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    triangles: Vec<Triangle>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two roots covering the unit square, split along the diagonal from
    /// `(0, 0)` to `(1, 1)` and chained as siblings.
    pub fn unit_square() -> Self {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let mut forest = Self::new();
        let first = forest.push([corners[0], corners[1], corners[2]]);
        let second = forest.push([corners[0], corners[3], corners[2]]);
        forest.link(first, second);
        forest
    }

    /// Rebuild a forest from fully resolved records. Record `i` must carry
    /// id `i`.
    pub(crate) fn from_records(triangles: Vec<Triangle>) -> Self {
        debug_assert!(triangles
            .iter()
            .enumerate()
            .all(|(i, t)| t.id.index() == i));
        Self { triangles }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Look up a triangle. Handles come from this forest, so a miss is a
    /// logic error and panics.
    #[inline]
    pub fn get(&self, id: TriangleId) -> &Triangle {
        &self.triangles[id.index()]
    }

    #[inline]
    pub fn try_get(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id.index())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: TriangleId) -> &mut Triangle {
        &mut self.triangles[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triangle> {
        self.triangles.iter()
    }

    /// The first root.
    pub fn head(&self) -> Option<TriangleId> {
        self.triangles.first().map(|t| t.id)
    }

    /// Room left before the id space runs out.
    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        MAX_TREE_TRIANGLES.saturating_sub(self.triangles.len())
    }

    fn push(&mut self, points: [Point; 3]) -> TriangleId {
        let id = TriangleId::new(self.triangles.len() as u16);
        self.triangles.push(Triangle::new(id, points));
        id
    }

    /// `first.next = second`, `second.prev = first`.
    fn link(&mut self, first: TriangleId, second: TriangleId) {
        self.get_mut(first).next_sibling = Some(second);
        self.get_mut(second).prev_sibling = Some(first);
    }

    /// Split `id` at the given fractions along edges 0-1, 0-2 and 1-2.
    ///
    /// Creates three corner children (each original vertex with its two
    /// adjacent split points) and one center child (the three split
    /// points). Returns `None` without changing anything when the triangle
    /// already has children or the id space is exhausted.
    pub fn subdivide(
        &mut self,
        id: TriangleId,
        r01: f64,
        r02: f64,
        r12: f64,
    ) -> Option<Vec<TriangleId>> {
        let [p0, p1, p2] = self.get(id).points;
        let m01 = p0.lerp(p1, r01);
        let m02 = p0.lerp(p2, r02);
        let m12 = p1.lerp(p2, r12);
        self.attach_children(
            id,
            &[
                [p0, m01, m02],
                [p1, m01, m12],
                [p2, m02, m12],
                [m01, m02, m12],
            ],
        )
    }

    /// Split `id` into three children around its centroid.
    pub fn subdivide_barycentric(&mut self, id: TriangleId) -> Option<Vec<TriangleId>> {
        let tri = self.get(id);
        let [p0, p1, p2] = tri.points;
        let c = tri.centroid();
        self.attach_children(id, &[[p0, p1, c], [p1, p2, c], [p2, p0, c]])
    }

    fn attach_children(
        &mut self,
        parent: TriangleId,
        shapes: &[[Point; 3]],
    ) -> Option<Vec<TriangleId>> {
        if !self.get(parent).is_terminal() || self.remaining_capacity() < shapes.len() {
            return None;
        }

        let children: Vec<TriangleId> = shapes
            .iter()
            .map(|&points| {
                let child = self.push(points);
                self.get_mut(child).parent = Some(parent);
                child
            })
            .collect();
        for pair in children.windows(2) {
            self.link(pair[0], pair[1]);
        }

        let first = children[0];
        let last = children[children.len() - 1];
        let next = self.get(parent).next_sibling;
        let prev = self.get(parent).prev_sibling;
        if let Some(neighbour) = self.first_child_forward(next) {
            self.link(last, neighbour);
        }
        if let Some(neighbour) = self.last_child_backward(prev) {
            self.link(neighbour, first);
        }

        self.get_mut(parent).children = children.clone();
        Some(children)
    }

    /// First child of the nearest subdivided triangle at or after `start`.
    fn first_child_forward(&self, start: Option<TriangleId>) -> Option<TriangleId> {
        let mut cur = start;
        for _ in 0..self.len() {
            let tri = self.get(cur?);
            if let Some(&child) = tri.children.first() {
                return Some(child);
            }
            cur = tri.next_sibling;
        }
        None
    }

    /// Last child of the nearest subdivided triangle at or before `start`.
    fn last_child_backward(&self, start: Option<TriangleId>) -> Option<TriangleId> {
        let mut cur = start;
        for _ in 0..self.len() {
            let tri = self.get(cur?);
            if let Some(&child) = tri.children.last() {
                return Some(child);
            }
            cur = tri.prev_sibling;
        }
        None
    }

    /// Append every triangle after `id` along its sibling chain.
    ///
    /// Walks are bounded by the forest size, so a corrupted cyclic chain
    /// terminates.
    pub fn collect_next_siblings(&self, id: TriangleId, out: &mut Vec<TriangleId>) {
        let mut cur = self.get(id).next_sibling;
        for _ in 0..self.len() {
            let Some(next) = cur else { break };
            out.push(next);
            cur = self.get(next).next_sibling;
        }
    }

    /// Append every triangle before `id` along its sibling chain.
    pub fn collect_prev_siblings(&self, id: TriangleId, out: &mut Vec<TriangleId>) {
        let mut cur = self.get(id).prev_sibling;
        for _ in 0..self.len() {
            let Some(prev) = cur else { break };
            out.push(prev);
            cur = self.get(prev).prev_sibling;
        }
    }

    /// Append the whole sibling chain of `id`, excluding `id` itself.
    pub fn collect_siblings(&self, id: TriangleId, out: &mut Vec<TriangleId>) {
        self.collect_next_siblings(id, out);
        self.collect_prev_siblings(id, out);
    }

    /// Append the parent of `id`, the parent's siblings, and so on up to
    /// the roots: every existing triangle coarser than `id`.
    pub fn collect_above(&self, id: TriangleId, out: &mut Vec<TriangleId>) {
        let mut cur = self.get(id).parent;
        for _ in 0..self.len() {
            let Some(parent) = cur else { break };
            out.push(parent);
            self.collect_siblings(parent, out);
            cur = self.get(parent).parent;
        }
    }

    /// Append every descendant of `id` in pre-order.
    pub fn collect_below(&self, id: TriangleId, out: &mut Vec<TriangleId>) {
        let mut stack: Vec<TriangleId> = self.get(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.get(next).children.iter().rev().copied());
        }
    }

    /// Depth of `id` (roots are 0).
    pub fn depth(&self, id: TriangleId) -> usize {
        let mut depth = 0;
        let mut cur = self.get(id).parent;
        while let Some(parent) = cur {
            depth += 1;
            if depth > self.len() {
                break;
            }
            cur = self.get(parent).parent;
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u16]) -> Vec<TriangleId> {
        raw.iter().map(|&r| TriangleId::new(r)).collect()
    }

    /// Walk the chain at the depth of `start` from its first element.
    fn chain_from(forest: &Forest, start: TriangleId) -> Vec<TriangleId> {
        let mut first = start;
        while let Some(prev) = forest.get(first).prev_sibling {
            first = prev;
        }
        let mut out = vec![first];
        forest.collect_next_siblings(first, &mut out);
        out
    }

    #[test]
    fn test_unit_square_roots() {
        let forest = Forest::unit_square();
        assert_eq!(forest.len(), 2);
        let a = forest.get(TriangleId::new(0));
        let b = forest.get(TriangleId::new(1));
        assert_eq!(a.next_sibling, Some(b.id));
        assert_eq!(b.prev_sibling, Some(a.id));
        assert!((a.area() + b.area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_subdivide_creates_chained_children() {
        let mut forest = Forest::unit_square();
        let children = forest.subdivide(TriangleId::new(0), 0.5, 0.5, 0.5).unwrap();
        assert_eq!(children, ids(&[2, 3, 4, 5]));
        for &c in &children {
            assert_eq!(forest.get(c).parent, Some(TriangleId::new(0)));
        }
        assert_eq!(chain_from(&forest, children[0]), children);
        assert!(!forest.get(TriangleId::new(0)).is_terminal());
    }

    #[test]
    fn test_subdivide_twice_is_refused() {
        let mut forest = Forest::unit_square();
        forest.subdivide(TriangleId::new(0), 0.5, 0.5, 0.5).unwrap();
        assert!(forest.subdivide(TriangleId::new(0), 0.5, 0.5, 0.5).is_none());
        assert_eq!(forest.len(), 6);
    }

    #[test]
    fn test_children_splice_across_parents() {
        let mut forest = Forest::unit_square();
        let left = forest.subdivide(TriangleId::new(0), 0.5, 0.5, 0.5).unwrap();
        let right = forest.subdivide(TriangleId::new(1), 0.5, 0.5, 0.5).unwrap();

        let chain = chain_from(&forest, right[2]);
        let expected: Vec<TriangleId> = left.iter().chain(right.iter()).copied().collect();
        assert_eq!(chain, expected);
        assert_eq!(forest.get(left[3]).next_sibling, Some(right[0]));
        assert_eq!(forest.get(right[0]).prev_sibling, Some(left[3]));
    }

    #[test]
    fn test_late_subdivision_is_spliced_in_between() {
        // Three triangles at depth 1 of root 0: subdivide the outer two
        // first, then the middle one, and expect the depth-2 chain in
        // left-to-right order.
        let mut forest = Forest::unit_square();
        let level1 = forest.subdivide(TriangleId::new(0), 0.5, 0.5, 0.5).unwrap();
        let a = forest.subdivide(level1[0], 0.5, 0.5, 0.5).unwrap();
        let c = forest.subdivide(level1[2], 0.5, 0.5, 0.5).unwrap();
        assert_eq!(forest.get(a[3]).next_sibling, Some(c[0]));

        let b = forest.subdivide(level1[1], 0.5, 0.5, 0.5).unwrap();
        let chain = chain_from(&forest, b[0]);
        let expected: Vec<TriangleId> = a.iter().chain(&b).chain(&c).copied().collect();
        assert_eq!(chain, expected);
    }

    #[test]
    fn test_roots_keep_their_own_chain() {
        let mut forest = Forest::unit_square();
        forest.subdivide(TriangleId::new(0), 0.5, 0.5, 0.5).unwrap();
        forest.subdivide(TriangleId::new(1), 0.5, 0.5, 0.5).unwrap();
        assert_eq!(chain_from(&forest, TriangleId::new(0)), ids(&[0, 1]));
    }

    #[test]
    fn test_collect_above_covers_coarser_levels() {
        let mut forest = Forest::unit_square();
        let left = forest.subdivide(TriangleId::new(0), 0.5, 0.5, 0.5).unwrap();
        forest.subdivide(TriangleId::new(1), 0.5, 0.5, 0.5).unwrap();
        let grandchildren = forest.subdivide(left[1], 0.5, 0.5, 0.5).unwrap();

        let mut above = Vec::new();
        forest.collect_above(grandchildren[0], &mut above);
        above.sort();
        // All eight depth-1 triangles plus both roots.
        assert_eq!(above, ids(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]));

        let mut roots_above = Vec::new();
        forest.collect_above(TriangleId::new(0), &mut roots_above);
        assert!(roots_above.is_empty());
    }

    #[test]
    fn test_collect_below_is_preorder() {
        let mut forest = Forest::unit_square();
        let children = forest.subdivide(TriangleId::new(0), 0.5, 0.5, 0.5).unwrap();
        let grand = forest.subdivide(children[0], 0.5, 0.5, 0.5).unwrap();
        let mut below = Vec::new();
        forest.collect_below(TriangleId::new(0), &mut below);
        let expected: Vec<TriangleId> = std::iter::once(children[0])
            .chain(grand.iter().copied())
            .chain(children[1..].iter().copied())
            .collect();
        assert_eq!(below, expected);
        assert_eq!(forest.depth(grand[0]), 2);
    }

    #[test]
    fn test_barycentric_children_share_centroid() {
        let mut forest = Forest::unit_square();
        let centroid = forest.get(TriangleId::new(0)).centroid();
        let children = forest.subdivide_barycentric(TriangleId::new(0)).unwrap();
        assert_eq!(children.len(), 3);
        let total: f64 = children.iter().map(|&c| forest.get(c).area()).sum();
        assert!((total - 0.5).abs() < 1e-12);
        for &c in &children {
            assert_eq!(forest.get(c).points[2], centroid);
        }
        assert_eq!(chain_from(&forest, children[1]), children);
    }
}
