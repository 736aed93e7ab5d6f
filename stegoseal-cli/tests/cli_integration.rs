//! CLI integration tests for stegoseal.
//!
//! These tests verify the CLI behavior by running the actual binary and
//! checking outputs, exit codes, and file artifacts.

use assert_cmd::Command;
use image::RgbaImage;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a Command for the stegoseal binary.
fn stegoseal() -> Command {
    Command::cargo_bin("stegoseal").unwrap()
}

/// Write a structured test PNG large enough for a multi-chunk grid.
fn write_test_png(path: &Path, width: u32, height: u32) {
    let mut img = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        pixel.0 = [
            (x % 251) as u8,
            (y % 241) as u8,
            ((x * 7 + y * 13) % 255) as u8,
            255,
        ];
    }
    img.save(path).unwrap();
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    stegoseal()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tamper-evident image sealing"))
        .stdout(predicate::str::contains("encode"))
        .stdout(predicate::str::contains("decode"));
}

#[test]
fn test_version_displays_version() {
    stegoseal()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stegoseal"));
}

#[test]
fn test_help_shows_exit_codes() {
    stegoseal()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("65"))
        .stdout(predicate::str::contains("66"));
}

#[test]
fn test_encode_help_shows_options() {
    stegoseal()
        .args(["encode", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INPUT"))
        .stdout(predicate::str::contains("OUTDIR"))
        .stdout(predicate::str::contains("--margin"));
}

#[test]
fn test_decode_help_shows_options() {
    stegoseal()
        .args(["decode", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INPUT"))
        .stdout(predicate::str::contains("--json"));
}

// ============================================================================
// Exit Code Tests
// ============================================================================

#[test]
fn test_missing_input_returns_input_error() {
    let temp = TempDir::new().unwrap();

    // Exit code 66 = EX_NOINPUT
    stegoseal()
        .args(["encode", "nonexistent.png", temp.path().to_str().unwrap()])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to read image"));
}

#[test]
fn test_decode_missing_input_returns_input_error() {
    stegoseal()
        .args(["decode", "nonexistent.png"])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to read image"));
}

#[test]
fn test_garbage_input_returns_input_error() {
    let temp = TempDir::new().unwrap();
    let bogus = temp.path().join("not_an_image.png");
    fs::write(&bogus, b"this is not a PNG").unwrap();

    stegoseal()
        .args(["decode", bogus.to_str().unwrap()])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to read image"));
}

#[test]
fn test_conflicting_verbose_quiet_rejected() {
    stegoseal()
        .args(["--verbose", "--quiet", "decode", "x.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ============================================================================
// Encode and Decode Roundtrip Tests
// ============================================================================

#[test]
fn test_encode_creates_sealed_image_and_overlay() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("photo.png");
    let outdir = temp.path().join("out");
    write_test_png(&input, 320, 240);

    stegoseal()
        .args([
            "encode",
            input.to_str().unwrap(),
            outdir.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Image sealed"))
        .stdout(predicate::str::contains("Merkle root:"));

    assert!(outdir.join("photo.png").exists(), "sealed image missing");
    assert!(
        outdir.join("photo.overlay.png").exists(),
        "grid overlay missing"
    );
}

#[test]
fn test_encode_decode_roundtrip_authentic() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("photo.png");
    let outdir = temp.path().join("out");
    write_test_png(&input, 320, 240);

    stegoseal()
        .args([
            "encode",
            input.to_str().unwrap(),
            outdir.to_str().unwrap(),
        ])
        .assert()
        .success();

    let sealed = outdir.join("photo.png");
    stegoseal()
        .args(["decode", sealed.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("AUTHENTIC"));

    assert!(
        outdir.join("photo.overlay.png").exists(),
        "decode overlay missing"
    );
}

#[test]
fn test_tampered_image_fails_with_verification_exit_code() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("photo.png");
    let outdir = temp.path().join("out");
    write_test_png(&input, 320, 240);

    stegoseal()
        .args([
            "encode",
            input.to_str().unwrap(),
            outdir.to_str().unwrap(),
        ])
        .assert()
        .success();

    // Tamper: flip a most-significant bit somewhere in the middle.
    let sealed = outdir.join("photo.png");
    let mut img = image::open(&sealed).unwrap().to_rgba8();
    img.get_pixel_mut(160, 120).0[0] ^= 0b1000_0000;
    img.save(&sealed).unwrap();

    // Exit code 65 = EX_DATAERR (verification failed)
    stegoseal()
        .args(["decode", sealed.to_str().unwrap()])
        .assert()
        .code(65)
        .stdout(predicate::str::contains("TAMPERED"))
        .stdout(predicate::str::contains("Tampered chunks:"));
}

#[test]
fn test_decode_json_report() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("photo.png");
    let outdir = temp.path().join("out");
    write_test_png(&input, 320, 240);

    stegoseal()
        .args([
            "encode",
            input.to_str().unwrap(),
            outdir.to_str().unwrap(),
        ])
        .assert()
        .success();

    let sealed = outdir.join("photo.png");
    let output = stegoseal()
        .args(["decode", "--json", sealed.to_str().unwrap()])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("stdout should be JSON");
    assert_eq!(report["verdict"], "authentic");
    assert!(report["canonical_root"].is_string());
    assert!(report["root_groups"].is_array());
}

#[test]
fn test_margin_mismatch_is_not_authentic() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("photo.png");
    let outdir = temp.path().join("out");
    write_test_png(&input, 640, 480);

    stegoseal()
        .args([
            "encode",
            "--margin",
            "20",
            input.to_str().unwrap(),
            outdir.to_str().unwrap(),
        ])
        .assert()
        .success();

    let sealed = outdir.join("photo.png");
    stegoseal()
        .args(["decode", "--margin", "40", sealed.to_str().unwrap()])
        .assert()
        .code(65);
}

// ============================================================================
// Quiet and Color Tests
// ============================================================================

#[test]
fn test_quiet_mode_minimal_output() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("photo.png");
    let outdir = temp.path().join("out");
    write_test_png(&input, 320, 240);

    let output = stegoseal()
        .args([
            "--quiet",
            "encode",
            input.to_str().unwrap(),
            outdir.to_str().unwrap(),
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    assert!(
        stdout.trim().is_empty(),
        "Quiet mode should have no stdout, got: {}",
        stdout
    );
}

#[test]
fn test_color_never_no_ansi() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("photo.png");
    let outdir = temp.path().join("out");
    write_test_png(&input, 320, 240);

    let output = stegoseal()
        .args([
            "--color",
            "never",
            "encode",
            input.to_str().unwrap(),
            outdir.to_str().unwrap(),
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    assert!(
        !stdout.contains("\x1b["),
        "Color=never stdout should not contain ANSI codes"
    );
}
