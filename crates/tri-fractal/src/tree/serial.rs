//! `TREE` records.
//!
//! ```text
//! "TREE" count:u16 record*
//! record = id:u16 parent:u16 prev:u16 next:u16 (x:frac y:frac){3}
//!          child_count:u8 (child:u16{child_count} | fit)
//! fit    = saturation:frac[0,1] brightness:frac[-255,255] error:frac[0,255]
//!          point_map:u8 source:u16
//! ```
//!
//! Records are written root by root along the root sibling chain, each root
//! followed by its descendants in pre-order. Reading is two-phase: all raw
//! records are collected into an id-indexed table first, then every
//! reference is checked and the forest is assembled.

use std::io::Write;

use super::TriangleTree;
use crate::codec::{ByteReader, ByteWriter};
use crate::error::FormatError;
use crate::fit::{PointMap, TriFit, BRIGHTNESS_LIMIT};
use crate::geometry::Point;
use crate::image::DoubleImage;
use crate::options::MAX_TREE_TRIANGLES;
use crate::triangle::{Forest, Triangle, TriangleId};

const TREE_MAGIC: &str = "TREE";
const MAX_ERROR: f64 = 255.0;

impl TriangleTree {
    /// Write the tree. Fails with [`FormatError::IncompleteTree`] while
    /// triangles are still pending.
    pub fn serialize<W: Write>(&self, out: &mut ByteWriter<W>) -> Result<(), FormatError> {
        if !self.queue.is_empty() {
            return Err(FormatError::IncompleteTree {
                unassigned: self.queue.len(),
            });
        }
        let count = self.forest.len();
        if count > MAX_TREE_TRIANGLES {
            return Err(FormatError::TooManyTriangles(count));
        }

        out.write_magic(TREE_MAGIC)?;
        out.write_u16(count as u16)?;

        let order = traversal_order(&self.forest);
        if order.len() != count {
            return Err(FormatError::CountMismatch {
                declared: count,
                found: order.len(),
            });
        }
        for id in order {
            write_record(self.forest.get(id), out)?;
        }
        Ok(())
    }

    /// Read a tree written by [`serialize`](Self::serialize). `image` becomes
    /// the tree's image; its raster is only used when rendering.
    pub fn unserialize(input: &mut ByteReader<'_>, image: DoubleImage) -> Result<Self, FormatError> {
        input.expect_magic(TREE_MAGIC)?;
        let count = input.read_u16()? as usize;

        let mut table: Vec<Option<RawRecord>> = vec![None; count];
        for _ in 0..count {
            let record = RawRecord::read(input)?;
            let slot = table
                .get_mut(record.id as usize)
                .ok_or(FormatError::IdOutOfRange {
                    id: record.id,
                    count,
                })?;
            if slot.is_some() {
                return Err(FormatError::DuplicateId(record.id));
            }
            *slot = Some(record);
        }

        // `count` distinct in-range ids fill every slot.
        let records: Vec<RawRecord> = table.into_iter().flatten().collect();
        let triangles = records
            .iter()
            .map(|r| r.resolve(count))
            .collect::<Result<Vec<_>, _>>()?;
        let forest = Forest::from_records(triangles);

        let reachable = traversal_order(&forest).len();
        if reachable != count {
            return Err(FormatError::CountMismatch {
                declared: count,
                found: reachable,
            });
        }
        tracing::debug!(triangles = count, "Read tree");
        Ok(TriangleTree::from_forest(forest, image))
    }
}

/// Every root along the root chain, each followed by its subtree in
/// pre-order. Each triangle appears at most once.
fn traversal_order(forest: &Forest) -> Vec<TriangleId> {
    let mut seen = vec![false; forest.len()];
    let mut order = Vec::with_capacity(forest.len());
    let mut root = forest.head();
    while let Some(r) = root {
        if seen[r.index()] {
            break;
        }
        let mut stack = vec![r];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            order.push(id);
            stack.extend(forest.get(id).children().iter().rev().copied());
        }
        root = forest.get(r).next_sibling();
    }
    order
}

fn write_record<W: Write>(tri: &Triangle, out: &mut ByteWriter<W>) -> Result<(), FormatError> {
    out.write_u16(tri.id().raw())?;
    out.write_u16(TriangleId::to_wire(tri.parent()))?;
    out.write_u16(TriangleId::to_wire(tri.prev_sibling()))?;
    out.write_u16(TriangleId::to_wire(tri.next_sibling()))?;
    for p in tri.points() {
        out.write_fraction(p.x, 0.0, 1.0)?;
        out.write_fraction(p.y, 0.0, 1.0)?;
    }
    out.write_u8(tri.children().len() as u8)?;
    if !tri.is_terminal() {
        for &child in tri.children() {
            out.write_u16(child.raw())?;
        }
        return Ok(());
    }
    let fit = tri.target().copied().unwrap_or_default();
    out.write_fraction(fit.saturation, 0.0, 1.0)?;
    out.write_fraction(fit.brightness, -BRIGHTNESS_LIMIT, BRIGHTNESS_LIMIT)?;
    out.write_fraction(fit.error, 0.0, MAX_ERROR)?;
    out.write_u8(fit.point_map.code())?;
    out.write_u16(TriangleId::to_wire(fit.source))
}

/// A record as read, before references are checked.
#[derive(Debug, Clone)]
struct RawRecord {
    id: u16,
    parent: u16,
    prev: u16,
    next: u16,
    points: [Point; 3],
    children: Vec<u16>,
    fit: Option<RawFit>,
}

#[derive(Debug, Clone)]
struct RawFit {
    saturation: f64,
    brightness: f64,
    error: f64,
    point_map: PointMap,
    source: u16,
}

impl RawRecord {
    fn read(input: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let id = input.read_u16()?;
        let parent = input.read_u16()?;
        let prev = input.read_u16()?;
        let next = input.read_u16()?;
        let mut points = [Point::default(); 3];
        for p in &mut points {
            p.x = input.read_fraction(0.0, 1.0)?;
            p.y = input.read_fraction(0.0, 1.0)?;
        }

        let child_count = input.read_u8()?;
        if !matches!(child_count, 0 | 3 | 4) {
            return Err(FormatError::InvalidChildCount {
                id,
                count: child_count,
            });
        }
        let mut children = Vec::with_capacity(child_count as usize);
        for _ in 0..child_count {
            children.push(input.read_u16()?);
        }

        let fit = if child_count == 0 {
            let saturation = input.read_fraction(0.0, 1.0)?;
            let brightness = input.read_fraction(-BRIGHTNESS_LIMIT, BRIGHTNESS_LIMIT)?;
            let error = input.read_fraction(0.0, MAX_ERROR)?;
            let code = input.read_u8()?;
            let point_map =
                PointMap::from_code(code).ok_or(FormatError::InvalidPointMap { id, code })?;
            let source = input.read_u16()?;
            Some(RawFit {
                saturation,
                brightness,
                error,
                point_map,
                source,
            })
        } else {
            None
        };

        Ok(Self {
            id,
            parent,
            prev,
            next,
            points,
            children,
            fit,
        })
    }

    fn resolve(&self, count: usize) -> Result<Triangle, FormatError> {
        let link = |field: &'static str, raw: u16| -> Result<Option<TriangleId>, FormatError> {
            match TriangleId::from_wire(raw) {
                Some(id) if id.index() >= count => Err(FormatError::UnresolvedReference {
                    from: self.id,
                    field,
                    to: raw,
                }),
                other => Ok(other),
            }
        };

        let mut tri = Triangle::new(TriangleId::new(self.id), self.points);
        tri.parent = link("parent", self.parent)?;
        tri.prev_sibling = link("previous sibling", self.prev)?;
        tri.next_sibling = link("next sibling", self.next)?;
        for &child in &self.children {
            let resolved = link("child", child)?.ok_or(FormatError::UnresolvedReference {
                from: self.id,
                field: "child",
                to: child,
            })?;
            tri.children.push(resolved);
        }
        if let Some(fit) = &self.fit {
            tri.target = Some(TriFit {
                point_map: fit.point_map,
                saturation: fit.saturation,
                brightness: fit.brightness,
                error: fit.error,
                source: link("source", fit.source)?,
            });
        }
        Ok(tri)
    }
}
