//! Drives the `trifrac` binary end to end.

mod common;

use std::path::Path;
use std::process::{Command, Output};

use common::{assert_fractal, assert_png, fixtures, fixtures::Workspace};
use pretty_assertions::assert_eq;
use trifrac::imaging::load_png;

fn trifrac(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trifrac"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run trifrac")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "trifrac failed: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
}

const SMALL_CONFIG: &str = "encoder:\n  divide: middle\n  max-triangles: 300\ndecoder:\n  iterations: 4\n";

#[test]
fn test_encode_decode_info() {
    let ws = Workspace::new();
    ws.png("ramp.png", &fixtures::grey_gradient(24, 24));
    ws.config(SMALL_CONFIG);

    let encode = trifrac(
        &["-q", "encode", "ramp.png", "-o", "ramp.frac", "--config", "config.yaml"],
        ws.root(),
    );
    assert_success(&encode);
    assert!(String::from_utf8_lossy(&encode.stdout).contains("Encoded"));
    assert_fractal(&std::fs::read(ws.path("ramp.frac")).unwrap());

    let decode = trifrac(
        &["-q", "decode", "ramp.frac", "-o", "out.png", "--config", "config.yaml"],
        ws.root(),
    );
    assert_success(&decode);
    let png = std::fs::read(ws.path("out.png")).unwrap();
    assert_png(&png);
    let decoded = load_png(&ws.path("out.png")).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (24, 24));
    assert!(!decoded.is_color());

    let info = trifrac(&["info", "ramp.frac"], ws.root());
    assert_success(&info);
    let stdout = String::from_utf8_lossy(&info.stdout);
    assert!(stdout.contains("ramp.png"), "{stdout}");
    assert!(stdout.contains("Greyscale"), "{stdout}");
    assert!(stdout.contains("24x24"), "{stdout}");
}

#[test]
fn test_default_output_names() {
    let ws = Workspace::new();
    ws.png("in.png", &fixtures::grey_gradient(12, 12));
    ws.config(SMALL_CONFIG);

    assert_success(&trifrac(
        &["-q", "encode", "in.png", "--config", "config.yaml"],
        ws.root(),
    ));
    assert!(ws.path("fractal.frac").exists());

    assert_success(&trifrac(&["-q", "decode", "fractal.frac", "-i", "2"], ws.root()));
    assert!(ws.path("decoded.png").exists());
}

#[test]
fn test_mode_follows_input_and_flags() {
    let ws = Workspace::new();
    ws.png("rgb.png", &fixtures::color_gradient(12, 12));
    ws.png("grey.png", &fixtures::grey_gradient(12, 12));
    ws.config(SMALL_CONFIG);
    let args = ["--config", "config.yaml", "-c", "20"];

    let run = |input: &str, out: &str, extra: &[&str]| {
        let mut all = vec!["-q", "encode", input, "-o", out];
        all.extend_from_slice(&args);
        all.extend_from_slice(extra);
        assert_success(&trifrac(&all, ws.root()));
        let info = trifrac(&["info", out], ws.root());
        String::from_utf8_lossy(&info.stdout).into_owned()
    };

    assert!(run("rgb.png", "a.frac", &[]).contains("Color"));
    assert!(run("grey.png", "b.frac", &[]).contains("Greyscale"));
    assert!(run("rgb.png", "c.frac", &["--grey"]).contains("Greyscale"));
    assert!(run("grey.png", "d.frac", &["--color"]).contains("Color"));
}

#[test]
fn test_decode_at_requested_size() {
    let ws = Workspace::new();
    ws.png("in.png", &fixtures::color_gradient(16, 16));
    ws.config(SMALL_CONFIG);
    assert_success(&trifrac(
        &["-q", "encode", "in.png", "-o", "in.frac", "--config", "config.yaml"],
        ws.root(),
    ));

    assert_success(&trifrac(
        &[
            "-q", "decode", "in.frac", "-o", "big.png", "-w", "40", "-H", "24", "-i", "3",
            "--fix-errors", "--sampling", "both",
        ],
        ws.root(),
    ));

    let decoded = load_png(&ws.path("big.png")).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 24));
    assert!(decoded.is_color());
}

#[test]
fn test_decode_from_seed_png() {
    let ws = Workspace::new();
    ws.png("in.png", &fixtures::grey_gradient(16, 16));
    ws.png("seed.png", &fixtures::color_gradient(5, 7));
    ws.config(SMALL_CONFIG);
    assert_success(&trifrac(
        &["-q", "encode", "in.png", "-o", "in.frac", "--config", "config.yaml"],
        ws.root(),
    ));

    assert_success(&trifrac(
        &["-q", "decode", "in.frac", "-o", "out.png", "-i", "2", "--seed", "seed.png"],
        ws.root(),
    ));
    let decoded = load_png(&ws.path("out.png")).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 16));
    assert!(!decoded.is_color());

    let missing = trifrac(&["decode", "in.frac", "--seed", "nope.png"], ws.root());
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("Failed to load seed"));
}

#[test]
fn test_edge_and_subdivision_flags() {
    let ws = Workspace::new();
    ws.png("in.png", &fixtures::grey_gradient(16, 16));
    ws.config(SMALL_CONFIG);

    assert_success(&trifrac(
        &[
            "-q", "encode", "in.png", "-o", "bary.frac", "--config", "config.yaml",
            "--divide", "low-entropy", "--edge-detector", "laplacian",
            "--subdivision", "barycentric",
        ],
        ws.root(),
    ));
    assert_success(&trifrac(&["info", "bary.frac"], ws.root()));

    let bad = trifrac(&["encode", "in.png", "--subdivision", "hexagons"], ws.root());
    assert!(!bad.status.success());
}

#[test]
fn test_version_flag() {
    let ws = Workspace::new();
    let output = trifrac(&["--version"], ws.root());
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("trifrac "));
}

#[test]
fn test_oversized_decode_is_an_error() {
    let ws = Workspace::new();
    ws.png("in.png", &fixtures::grey_gradient(8, 8));
    ws.config(SMALL_CONFIG);
    assert_success(&trifrac(
        &["-q", "encode", "in.png", "-o", "in.frac", "--config", "config.yaml"],
        ws.root(),
    ));

    let output = trifrac(
        &["decode", "in.frac", "-w", "4000000000", "-H", "4000000000"],
        ws.root(),
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("image dimensions"));
}

#[test]
fn test_rejects_bad_inputs() {
    let ws = Workspace::new();
    std::fs::write(ws.path("junk.frac"), b"NOTAFRACTAL").unwrap();
    ws.png("in.png", &fixtures::grey_gradient(8, 8));

    let missing = trifrac(&["encode", "missing.png"], ws.root());
    assert!(!missing.status.success());

    let junk = trifrac(&["info", "junk.frac"], ws.root());
    assert!(!junk.status.success());
    assert!(String::from_utf8_lossy(&junk.stderr).contains("bad magic"));

    let bad_divide = trifrac(&["encode", "in.png", "--divide", "sideways"], ws.root());
    assert!(!bad_divide.status.success());

    let both_modes = trifrac(&["encode", "in.png", "--color", "--grey"], ws.root());
    assert!(!both_modes.status.success());
}
