extern crate assert_cmd;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

#[test]
fn renders_a_small_plain_pixmap() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("small.ppm");
    let raw = dir.path().join("raw.ppm");

    Command::cargo_bin("mandelblur")
        .unwrap()
        .args(&["--size", "30x20", "--steps", "2", "--threads", "3"])
        .arg("--raw")
        .arg(&raw)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Mandelbrot pixels:").from_utf8());

    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("P3"));
    assert_eq!(lines.next(), Some("30 20"));
    assert_eq!(lines.next(), Some("255"));
    let pixels: Vec<&str> = lines.collect();
    assert_eq!(pixels.len(), 600);
    for pixel in pixels {
        let values: Vec<u16> = pixel.split(' ').map(|v| v.parse().unwrap()).collect();
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|&v| v <= 255));
    }

    assert!(fs::read_to_string(&raw).unwrap().starts_with("P3\n30 20\n255\n"));
}

#[test]
fn custom_gradient_and_window_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("custom.pnm");

    Command::cargo_bin("mandelblur")
        .unwrap()
        .args(&[
            "--size",
            "16x16",
            "--leftlower=-2.0,-1.5",
            "--rightupper=1.0,1.5",
            "--gradient",
            "0,0,0:255,0,0:0:0.5",
            "--gradient",
            "255,0,0:255,255,0:0.5:1",
            "--kernel-width",
            "3",
            "--normalize-kernel",
            "--steps",
            "1",
        ])
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(&fs::read(&out).unwrap()[..2], b"P6");
}

#[test]
fn verify_reports_matching_filters() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("verified.ppm");

    Command::cargo_bin("mandelblur")
        .unwrap()
        .args(&["--size", "24x16", "--steps", "3", "--threads", "4", "--verify"])
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sequential and parallel results match: true").from_utf8());
}

#[test]
fn oversized_image_is_a_configuration_error() {
    Command::cargo_bin("mandelblur")
        .unwrap()
        .args(&["-o", "unused.ppm", "--size", "4294967296x4294967296"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure").from_utf8());
}

#[test]
fn malformed_gradient_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.ppm");

    Command::cargo_bin("mandelblur")
        .unwrap()
        .args(&["--size", "8x8", "--gradient", "0,0,0:9,9,9:0:0.5"])
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed gradient").from_utf8());

    assert!(!out.exists());
}

#[test]
fn even_kernel_width_is_refused() {
    Command::cargo_bin("mandelblur")
        .unwrap()
        .args(&["-o", "unused.ppm", "--kernel-width", "4"])
        .assert()
        .failure();
}
