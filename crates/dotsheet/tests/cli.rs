use std::fs;
use std::path::Path;

use assert_cmd::Command;
use dotsheet::code::CodeTable;
use dotsheet::{Corner, FrameReport, GeometryMemory, Keypoint, Palette};
use predicates::prelude::*;

const SHEET_ID: u32 = 7;

/// Print the requested corners of one sheet spanning (80, 60) .. (380, 260).
fn write_frame(dir: &Path, name: &str, corners: &[Corner]) -> (String, String) {
    let mut img = image::RgbImage::from_pixel(460, 320, image::Rgb([255, 255, 255]));
    let palette = Palette::default();
    let mut keypoints = Vec::new();

    for &corner in corners {
        let (origin, a, b): ((f32, f32), (f32, f32), (f32, f32)) = match corner {
            Corner::TopLeft => ((80.0, 60.0), (0.0, 1.0), (1.0, 0.0)),
            Corner::TopRight => ((380.0, 60.0), (-1.0, 0.0), (0.0, 1.0)),
            Corner::BottomRight => ((380.0, 260.0), (0.0, -1.0), (-1.0, 0.0)),
            Corner::BottomLeft => ((80.0, 260.0), (1.0, 0.0), (0.0, -1.0)),
        };
        let code = CodeTable::standard()
            .code_for(SHEET_ID, corner)
            .expect("id in range");
        let steps = [(a, 3.0), (a, 2.0), (a, 1.0), (a, 0.0), (b, 1.0), (b, 2.0), (b, 3.0)];
        for (&(step, k), &color) in steps.iter().zip(&code) {
            let (x, y) = (origin.0 + step.0 * 20.0 * k, origin.1 + step.1 * 20.0 * k);
            let c = palette.color(color as usize).expect("palette color");
            let px = image::Rgb([c.r as u8, c.g as u8, c.b as u8]);
            for dy in -6i32..=6 {
                for dx in -6i32..=6 {
                    if dx * dx + dy * dy <= 36 {
                        img.put_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32, px);
                    }
                }
            }
            keypoints.push(Keypoint::new(x, y, 12.0));
        }
    }

    let image_path = dir.join(format!("{name}.png"));
    img.save(&image_path).expect("save png");
    let keypoints_path = dir.join(format!("{name}.json"));
    fs::write(
        &keypoints_path,
        serde_json::to_string(&keypoints).expect("serialize"),
    )
    .expect("write keypoints");
    (
        image_path.display().to_string(),
        keypoints_path.display().to_string(),
    )
}

#[test]
fn help_lists_the_inputs() {
    Command::cargo_bin("dotsheet")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--keypoints").and(predicate::str::contains("--memory")));
}

#[test]
fn memory_file_carries_the_sheet_into_the_next_frame() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").expect("write config");
    let memory = dir.path().join("memory.json");
    let report = dir.path().join("report.json");

    let (image, keypoints) = write_frame(dir.path(), "full", &Corner::ALL);
    Command::cargo_bin("dotsheet")
        .expect("binary")
        .args(["--config", &config.display().to_string()])
        .args(["--image", &image, "--keypoints", &keypoints])
        .args(["--memory", &memory.display().to_string()])
        .args(["--output", &report.display().to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 pages"));

    let remembered = GeometryMemory::load_json(&memory).expect("memory written");
    assert!(remembered.sheet(SHEET_ID).is_some());

    // Only the left corners are visible in the second frame.
    let (image, keypoints) = write_frame(
        dir.path(),
        "partial",
        &[Corner::TopLeft, Corner::BottomLeft],
    );
    let out = Command::cargo_bin("dotsheet")
        .expect("binary")
        .args(["--config", &config.display().to_string()])
        .args(["--image", &image, "--keypoints", &keypoints])
        .args(["--memory", &memory.display().to_string()])
        .output()
        .expect("run");
    assert!(out.status.success());
    let parsed: FrameReport = serde_json::from_slice(&out.stdout).expect("report on stdout");
    assert_eq!(parsed.keypoints, 14);
    assert_eq!(parsed.pages.len(), 1);
    assert_eq!(parsed.pages[0].id, SHEET_ID);
    assert_eq!(parsed.pages[0].observed, [true, false, false, true]);
}

#[test]
fn missing_config_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    Command::cargo_bin("dotsheet")
        .expect("binary")
        .args(["--config", &dir.path().join("none.json").display().to_string()])
        .args(["--image", "frame.png", "--keypoints", "kp.json"])
        .assert()
        .failure();
}
