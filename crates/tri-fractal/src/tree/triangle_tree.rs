//! Breadth-first encoder for one image channel.

use std::collections::VecDeque;
use std::fmt;

use crate::error::GeometryError;
use crate::fit::TriFit;
use crate::image::{Canvas, DoubleImage};
use crate::options::SubdivisionMethod;
use crate::triangle::{Forest, TriangleId};

/// A triangle forest over one [`DoubleImage`], plus the FIFO of triangles
/// that still need a fractal code.
///
/// Encoding starts from the two roots of the unit square. Each call to
/// [`assign_one`](Self::assign_one) takes the oldest pending triangle and
/// either accepts a fit for it or subdivides it and queues the children, so
/// triangles are processed coarse to fine.
#[derive(Debug, Clone)]
pub struct TriangleTree {
    pub(super) forest: Forest,
    pub(super) queue: VecDeque<TriangleId>,
    pub(super) image: DoubleImage,
}

impl TriangleTree {
    /// Fresh tree with both roots pending.
    pub fn new(image: DoubleImage) -> Self {
        let forest = Forest::unit_square();
        let queue = forest.iter().map(|t| t.id()).collect();
        Self {
            forest,
            queue,
            image,
        }
    }

    /// Tree around an already complete forest (nothing pending).
    pub(crate) fn from_forest(forest: Forest, image: DoubleImage) -> Self {
        Self {
            forest,
            queue: VecDeque::new(),
            image,
        }
    }

    #[inline]
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    #[inline]
    pub fn image(&self) -> &DoubleImage {
        &self.image
    }

    #[inline]
    pub fn image_mut(&mut self) -> &mut DoubleImage {
        &mut self.image
    }

    /// First root.
    #[inline]
    pub fn head(&self) -> Option<TriangleId> {
        self.forest.head()
    }

    /// Triangles waiting for a code, oldest first.
    #[inline]
    pub fn unassigned(&self) -> &VecDeque<TriangleId> {
        &self.queue
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forest.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    /// Most recently created triangle.
    pub fn last_id(&self) -> Option<TriangleId> {
        self.forest.iter().last().map(|t| t.id())
    }

    /// Process the oldest pending triangle. Returns it, or `None` when
    /// nothing is pending.
    ///
    /// A triangle without coarser candidates (a root) is always subdivided.
    /// Any other triangle is compared against every coarser triangle and
    /// accepted when the best fit's error is below `cutoff`, when the
    /// triangle cap leaves no room for its children, or when it covers too
    /// few samples to split further. A forced accept without any usable
    /// source falls back to a flat fill. Otherwise it is subdivided and its
    /// children join the queue. Whenever the id space is exhausted the
    /// triangle is accepted as is.
    pub fn assign_one(&mut self, cutoff: f64) -> Option<TriangleId> {
        let id = self.queue.pop_front()?;

        let mut candidates = Vec::new();
        self.forest.collect_above(id, &mut candidates);
        if candidates.is_empty() {
            if self.subdivide(id).is_none() {
                self.accept(id, TriFit::NONE);
            }
            return Some(id);
        }

        let options = self.image.options();
        let child_count = match options.subdivision {
            SubdivisionMethod::EdgeRatios => 4,
            SubdivisionMethod::Barycentric => 3,
        };
        let capped = self.forest.len() + child_count > options.triangle_cap()
            || self.forest.remaining_capacity() < child_count;
        let min_samples = options.min_samples;
        let starved = self.image.points_inside(self.forest.get(id)).len() < min_samples;

        let fit = self.image.best_match(&self.forest, id, &candidates);
        if fit.is_valid() && fit.error < cutoff {
            self.accept(id, fit);
            return Some(id);
        }
        if capped || starved {
            tracing::trace!(triangle = %id, capped, starved, "Forced acceptance");
            self.accept(id, fit);
            return Some(id);
        }

        if self.subdivide(id).is_none() {
            self.accept(id, fit);
        }
        Some(id)
    }

    fn accept(&mut self, id: TriangleId, fit: TriFit) {
        let fit = if fit.is_valid() {
            fit
        } else {
            self.image.flat_fit(self.forest.get(id))
        };
        tracing::trace!(triangle = %id, %fit, "Accepted fit");
        self.forest.get_mut(id).set_target(fit);
    }

    /// Split `id` per the configured subdivision and queue the children.
    ///
    /// Edge-ratio splits place each split point with
    /// [`DoubleImage::best_divide`]. Returns `None` when the triangle is
    /// already split or the id space is exhausted.
    pub fn subdivide(&mut self, id: TriangleId) -> Option<Vec<TriangleId>> {
        let children = match self.image.options().subdivision {
            SubdivisionMethod::EdgeRatios => {
                let [p0, p1, p2] = *self.forest.get(id).points();
                let r01 = self.image.best_divide(p0, p1);
                let r02 = self.image.best_divide(p0, p2);
                let r12 = self.image.best_divide(p1, p2);
                self.forest.subdivide(id, r01, r02, r12)?
            }
            SubdivisionMethod::Barycentric => self.forest.subdivide_barycentric(id)?,
        };
        tracing::trace!(triangle = %id, children = children.len(), "Subdivided");
        self.queue.extend(children.iter().copied());
        Some(children)
    }

    /// Drain the queue with [`assign_one`](Self::assign_one).
    pub fn assign_all(&mut self, cutoff: f64) {
        while self.assign_one(cutoff).is_some() {}
    }

    /// Every triangle coarser than `id`: its parent, the parent's
    /// siblings, and so on up to the roots.
    pub fn all_above(&self, id: TriangleId) -> Vec<TriangleId> {
        let mut out = Vec::new();
        self.forest.collect_above(id, &mut out);
        out
    }

    pub fn all_siblings(&self, id: TriangleId) -> Vec<TriangleId> {
        let mut out = Vec::new();
        self.forest.collect_siblings(id, &mut out);
        out
    }

    pub fn all_next_siblings(&self, id: TriangleId) -> Vec<TriangleId> {
        let mut out = Vec::new();
        self.forest.collect_next_siblings(id, &mut out);
        out
    }

    pub fn all_prev_siblings(&self, id: TriangleId) -> Vec<TriangleId> {
        let mut out = Vec::new();
        self.forest.collect_prev_siblings(id, &mut out);
        out
    }

    /// Paint every fitted terminal triangle into `canvas`, reading sources
    /// from this tree's image.
    pub fn render(&mut self, canvas: &mut Canvas) -> Result<(), GeometryError> {
        for tri in self.forest.iter() {
            if !tri.is_terminal() {
                continue;
            }
            let Some(fit) = tri.target() else { continue };
            let source = fit.source.and_then(|s| self.forest.try_get(s));
            self.image.paint(tri, source, canvas)?;
        }
        Ok(())
    }

    /// Summary of the tree's shape and fit quality.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            triangles: self.forest.len(),
            ..TreeStats::default()
        };
        let mut error_sum = 0.0;
        for tri in self.forest.iter() {
            stats.max_depth = stats.max_depth.max(self.forest.depth(tri.id()));
            if !tri.is_terminal() {
                continue;
            }
            stats.terminals += 1;
            if let Some(fit) = tri.target() {
                if fit.is_flat() {
                    stats.flat_fits += 1;
                }
                error_sum += fit.error.max(0.0);
            }
        }
        if stats.terminals > 0 {
            stats.mean_error = error_sum / stats.terminals as f64;
        }
        stats
    }
}

/// Shape and quality summary of a [`TriangleTree`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TreeStats {
    pub triangles: usize,
    pub terminals: usize,
    /// Terminals painted with a constant instead of a source.
    pub flat_fits: usize,
    pub max_depth: usize,
    pub mean_error: f64,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} triangles, {} terminal ({} flat), depth {}, mean error {:.3}",
            self.triangles, self.terminals, self.flat_fits, self.max_depth, self.mean_error
        )
    }
}
