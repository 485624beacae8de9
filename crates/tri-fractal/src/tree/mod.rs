//! Per-channel encoding state and its `TREE` serialization.

mod serial;
mod triangle_tree;

pub use triangle_tree::{TreeStats, TriangleTree};
