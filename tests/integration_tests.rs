mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn snapurl() -> Command {
    let mut cmd = Command::cargo_bin("snapurl").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    snapurl().arg("--help").assert().success();
}

#[test]
fn test_upload_help() {
    snapurl()
        .args(["upload", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--profile"));
}

#[test]
fn test_compress_help() {
    snapurl().args(["compress", "--help"]).assert().success();
}

#[test]
fn test_profiles_lists_presets() {
    snapurl()
        .arg("profiles")
        .assert()
        .success()
        .stdout(predicate::str::contains("tiny"))
        .stdout(predicate::str::contains("balanced"))
        .stdout(predicate::str::contains("(default)"))
        .stdout(predicate::str::contains("original"));
}

#[test]
fn test_upload_missing_args() {
    snapurl().arg("upload").assert().failure();
}

#[test]
fn test_compress_missing_args() {
    snapurl().arg("compress").assert().failure();
}

#[test]
fn test_compress_nonexistent_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    snapurl()
        .args(["compress", "nonexistent.jpg"])
        .arg(temp.path().join("out.jpg"))
        .assert()
        .failure();
}

#[test]
fn test_upload_unknown_profile_fails() {
    snapurl()
        .args(["upload", "a.jpg", "--profile", "huge"])
        .assert()
        .failure();
}

#[test]
fn test_upload_no_images_found() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("notes.txt").write_str("hello").unwrap();

    snapurl()
        .arg("upload")
        .arg(temp.path())
        .arg("--out-dir")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No image files found"));
}

#[test]
fn test_upload_to_directory_store() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("input");
    input.create_dir_all().unwrap();
    input
        .child("a.png")
        .write_binary(&common::gradient_png(64, 32))
        .unwrap();
    input
        .child("b.png")
        .write_binary(&common::gradient_png(32, 64))
        .unwrap();
    let out = temp.child("public");

    snapurl()
        .arg("upload")
        .arg(input.path())
        .arg("--out-dir")
        .arg(out.path())
        .args(["--public-base-url", "https://cdn.example.com/img"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://cdn.example.com/img/"))
        .stdout(predicate::str::contains("Uploaded: 2/2"));

    let stored = std::fs::read_dir(out.path()).unwrap().count();
    assert_eq!(stored, 2);
}

#[test]
fn test_upload_json_report_with_metadata() {
    let temp = assert_fs::TempDir::new().unwrap();
    let image = temp.child("shot.png");
    image.write_binary(&common::gradient_png(40, 40)).unwrap();
    let broken = temp.child("broken.jpg");
    broken.write_str("not really a jpeg").unwrap();
    let metadata = temp.child("uploads.jsonl");

    let output = snapurl()
        .arg("upload")
        .arg(image.path())
        .arg(broken.path())
        .arg("--out-dir")
        .arg(temp.path().join("out"))
        .arg("--metadata")
        .arg(metadata.path())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["completed"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["items"][0]["status"], "completed");
    assert_eq!(report["items"][1]["status"], "failed");
    assert!(report["items"][0]["public_url"]
        .as_str()
        .unwrap()
        .starts_with("file://"));

    metadata.assert(predicate::str::contains("\"file_name\":\"shot.png\""));
}

#[test]
fn test_upload_all_failed_exits_with_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let broken = temp.child("broken.png");
    broken.write_str("garbage").unwrap();

    snapurl()
        .arg("upload")
        .arg(broken.path())
        .arg("--out-dir")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.png"));
}

#[test]
fn test_compress_writes_output() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("big.png");
    input
        .write_binary(&common::noise_png(600, 300))
        .unwrap();
    let output = temp.child("small.jpg");

    snapurl()
        .arg("compress")
        .arg(input.path())
        .arg(output.path())
        .args(["--profile", "tiny"])
        .assert()
        .success()
        .stdout(predicate::str::contains("480x240"));

    output.assert(predicate::path::exists());
    let bytes = std::fs::read(output.path()).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
}
