//! Test images and workspace helpers.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tri_fractal::Raster;
use trifrac::imaging::save_png;

/// Smooth diagonal ramp, 0..=255 across the image.
pub fn grey_gradient(width: u32, height: u32) -> Raster {
    let span = (width + height).saturating_sub(2).max(1);
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| ((x + y) * 255 / span) as u8))
        .collect();
    Raster::from_grey(width, height, data)
}

/// Red ramp left to right, blue ramp top to bottom, constant green.
pub fn color_gradient(width: u32, height: u32) -> Raster {
    let wx = width.saturating_sub(1).max(1);
    let hy = height.saturating_sub(1).max(1);
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[(x * 255 / wx) as u8, 96, (y * 255 / hy) as u8]);
        }
    }
    Raster::from_rgb(width, height, data)
}

/// Scratch directory that is removed when dropped.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `raster` as `name` and return its path.
    pub fn png(&self, name: &str, raster: &Raster) -> PathBuf {
        let path = self.path(name);
        save_png(raster, &path).expect("Failed to write fixture PNG");
        path
    }

    /// Write a YAML config file and return its path.
    pub fn config(&self, yaml: &str) -> PathBuf {
        let path = self.path("config.yaml");
        std::fs::write(&path, yaml).expect("Failed to write config");
        path
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
