use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_kestrel_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("kestrel")
}

#[test]
fn test_capture_command_help() {
    let mut cmd = Command::new(get_kestrel_bin());
    cmd.arg("capture").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Capture a screenshot of a page once it has rendered and settled",
        ))
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--selector"))
        .stdout(predicate::str::contains("--wait"))
        .stdout(predicate::str::contains("--settle-ms"))
        .stdout(predicate::str::contains("--full-page"));
}

#[test]
fn test_capture_defaults_shown_in_help() {
    let mut cmd = Command::new(get_kestrel_bin());
    cmd.arg("capture").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:5173/"))
        .stdout(predicate::str::contains("nav:not([aria-label])"))
        .stdout(predicate::str::contains("5000"));
}

#[test]
fn test_capture_command_without_chrome() {
    let mut cmd = Command::new(get_kestrel_bin());
    cmd.arg("capture")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Chrome not found"));
}

#[test]
fn test_capture_command_rejects_bad_url() {
    // Validation fails before any Chrome lookup
    let mut cmd = Command::new(get_kestrel_bin());
    cmd.arg("capture")
        .arg("--url")
        .arg("not a url")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("bad target URL"));
}

#[test]
fn test_capture_command_rejects_non_http_url() {
    let mut cmd = Command::new(get_kestrel_bin());
    cmd.arg("capture")
        .arg("--url")
        .arg("file:///etc/passwd")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
}

#[test]
fn test_capture_command_rejects_bad_viewport() {
    let mut cmd = Command::new(get_kestrel_bin());
    cmd.arg("capture")
        .arg("--viewport")
        .arg("banana")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("viewport"));
}

#[test]
fn test_capture_command_rejects_bad_wait_value() {
    let mut cmd = Command::new(get_kestrel_bin());
    cmd.arg("capture").arg("--wait").arg("sometimes");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_capture_flags_parse_together() {
    // All flags accepted; the run still fails on the missing binary
    let mut cmd = Command::new(get_kestrel_bin());
    cmd.arg("capture")
        .arg("--url")
        .arg("http://localhost:5173/about")
        .arg("--output")
        .arg("shots/about.png")
        .arg("--selector")
        .arg("main h1")
        .arg("--wait")
        .arg("fixed")
        .arg("--settle-ms")
        .arg("1000")
        .arg("--full-page")
        .arg("--viewport")
        .arg("1920x1080")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Chrome not found"));
}
