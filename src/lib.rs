//! trifrac - triangle-based fractal image compression
//!
//! Command-line front end for the `tri-fractal` codec.
//! This library exposes modules for integration testing.

pub mod error;
pub mod imaging;
pub mod models;
pub mod progress;
