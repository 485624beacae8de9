//! The triangle forest.
//!
//! [`Triangle`] is a single node; [`Forest`] is the arena that owns every
//! node of one tree and performs subdivision and sibling-chain maintenance.

mod forest;
mod triangle;

pub use forest::Forest;
pub use triangle::{Triangle, TriangleId};
