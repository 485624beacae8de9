//! Shared helpers for trifrac integration tests: gradient rasters, a
//! temporary workspace that writes PNG and YAML fixtures, and assertions on
//! PNG and fractal files.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
