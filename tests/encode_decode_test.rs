//! Library-level round trips through PNG files and fractal files.

mod common;

use common::{assert_fractal, assert_png, fixtures, fixtures::Workspace};
use pretty_assertions::assert_eq;
use tri_fractal::{
    Channel, DecoderOptions, DivideType, EncoderOptions, FractalImage, ImageType, NoProgress,
};
use trifrac::imaging::{encode_png, load_png};
use trifrac::models::AppConfig;

fn quick_options() -> EncoderOptions {
    EncoderOptions::default()
        .divide(DivideType::Middle)
        .max_triangles(400)
}

#[test]
fn test_png_round_trip_keeps_pixels() {
    let ws = Workspace::new();
    let grey = fixtures::grey_gradient(13, 7);
    let color = fixtures::color_gradient(9, 5);

    let grey_back = load_png(&ws.png("grey.png", &grey)).unwrap();
    let color_back = load_png(&ws.png("color.png", &color)).unwrap();

    assert_eq!(grey_back, grey);
    assert_eq!(color_back, color);
    assert_png(&encode_png(&color).unwrap());
}

#[test]
fn test_encode_write_read_decode() {
    let ws = Workspace::new();
    let source = ws.png("ramp.png", &fixtures::grey_gradient(32, 32));
    let original = load_png(&source).unwrap();

    let mut fractal = FractalImage::new(
        original.clone(),
        ImageType::Greyscale,
        quick_options(),
        &source.to_string_lossy(),
    );
    fractal.encode(&mut NoProgress);

    let path = ws.path("ramp.frac");
    let file = std::fs::File::create(&path).unwrap();
    fractal.serialize(file).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_fractal(&bytes);
    let mut loaded = FractalImage::unserialize(&bytes).unwrap();
    assert_eq!(loaded.metadata().source_filename, "ramp.png");
    assert_eq!(loaded.triangle_count(), fractal.triangle_count());

    let decoded = loaded
        .decode(&DecoderOptions::default().iterations(20))
        .unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 32));

    // A flat grey guess is off by about 64 on this ramp.
    let error = common::mean_abs_diff(&decoded, &original, Channel::Grey);
    assert!(error < 30.0, "mean error {error}");
}

#[test]
fn test_color_encode_decodes_three_channels() {
    let raster = fixtures::color_gradient(16, 16);
    let mut fractal = FractalImage::new(raster, ImageType::Color, quick_options(), "c.png");
    fractal.encode(&mut NoProgress);

    let bytes = fractal.to_bytes().unwrap();
    let mut loaded = FractalImage::unserialize(&bytes).unwrap();
    assert_eq!(loaded.image_type(), ImageType::Color);
    assert_eq!(loaded.trees().len(), 3);

    let decoded = loaded
        .decode(&DecoderOptions::default().iterations(3).size(20, 10))
        .unwrap();
    assert!(decoded.is_color());
    assert_eq!((decoded.width(), decoded.height()), (20, 10));
}

#[test]
fn test_config_file_feeds_options() {
    let ws = Workspace::new();
    let path = ws.config(
        "mode: greyscale\nencoder:\n  error-cutoff: 4.0\n  divide: middle\ndecoder:\n  iterations: 7\n",
    );

    let config = AppConfig::load(&path).unwrap();

    assert_eq!(config.mode, Some(ImageType::Greyscale));
    assert_eq!(config.encoder.error_cutoff, 4.0);
    assert_eq!(config.encoder.divide, DivideType::Middle);
    assert_eq!(config.decoder.iterations, 7);
}

#[test]
fn test_config_errors_are_reported() {
    let ws = Workspace::new();

    let missing = AppConfig::load(&ws.path("nope.yaml")).unwrap_err();
    assert!(missing.to_string().contains("Failed to read config"));

    let bad = ws.config("encoder:\n  error-cutoff: [1, 2]\n");
    let malformed = AppConfig::load(&bad).unwrap_err();
    assert!(malformed.to_string().contains("Failed to parse config"));
}
