use std::path::{Path, PathBuf};

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_snapture")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "snapture.exe"
            } else {
                "snapture"
            });
            p
        })
}

fn write_still(path: &Path, rgb: [u8; 3]) {
    let img = image::RgbaImage::from_pixel(24, 18, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    img.save(path).unwrap();
}

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("cli_smoke").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn cli_compose_writes_png() {
    let dir = scratch("compose");
    let a = dir.join("a.png");
    let b = dir.join("b.png");
    write_still(&a, [200, 40, 40]);
    write_still(&b, [40, 40, 200]);
    let out = dir.join("strip.png");

    let status = std::process::Command::new(exe())
        .args(["compose", "--filter", "sepia", "--frame", "Ocean", "--scale", "1"])
        .arg("--photo")
        .arg(&a)
        .arg("--photo")
        .arg(&b)
        .arg("--out")
        .arg(&out)
        .env_remove("SNAPTURE_FONT")
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out).unwrap();
    assert_eq!((img.width(), img.height()), (400, 600));
}

#[test]
fn cli_booth_runs_a_full_session() {
    let dir = scratch("booth");
    let still = dir.join("still.png");
    let upload = dir.join("upload.png");
    write_still(&still, [10, 120, 10]);
    write_still(&upload, [120, 10, 120]);
    let out_dir = dir.join("out");

    let status = std::process::Command::new(exe())
        .args(["booth", "--layout", "strip-3-vertical", "--timer", "3", "--no-wait"])
        .arg("--stills")
        .arg(&still)
        .arg("--upload")
        .arg(&upload)
        .arg("--out-dir")
        .arg(&out_dir)
        .env("SNAPTURE_EXPORT_SCALE", "1")
        .env_remove("SNAPTURE_FONT")
        .env_remove("SNAPTURE_OUT_DIR")
        .status()
        .unwrap();
    assert!(status.success());

    let written: Vec<_> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("Snapture-strip-"));
    assert!(written[0].ends_with(".png"));
}

#[test]
fn cli_lists_tables() {
    let out = std::process::Command::new(exe())
        .arg("filters")
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert_eq!(text.lines().count(), 15);
    assert!(text.contains("sepia(1)"));

    let out = std::process::Command::new(exe()).arg("layouts").output().unwrap();
    assert!(String::from_utf8(out.stdout).unwrap().contains("strip-mixed"));

    let out = std::process::Command::new(exe()).arg("frames").output().unwrap();
    assert_eq!(String::from_utf8(out.stdout).unwrap().lines().count(), 18);
}

#[test]
fn cli_rejects_unknown_filter() {
    let status = std::process::Command::new(exe())
        .args(["compose", "--photo", "x.png", "--out", "y.png", "--filter", "glitter"])
        .status()
        .unwrap();
    assert!(!status.success());
}
