//! Integration tests for `dossier verify`.
#![allow(clippy::expect_used)]

use std::io::Write as _;

use std::path::PathBuf;
use std::process::{Command, Output};

/// Path to the compiled `dossier` binary.
fn dossier_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("dossier");
    path
}

/// Path to a shared fixture file.
fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../tests/fixtures");
    path.push(name);
    path.to_str().expect("utf-8 path").to_owned()
}

fn run(args: &[&str]) -> Output {
    Command::new(dossier_bin())
        .args(args)
        .env_remove("DOSSIER_POLICY_CONFIG")
        .env_remove("DOSSIER_MAX_FILE_SIZE")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("run dossier")
}

#[test]
fn fixture_is_consistent_exit_0() {
    let out = run(&["verify", &fixture("org.json")]);
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("snapshot: 30 pairs"), "stdout: {stdout}");
    assert!(stdout.contains("synthetic:"), "stdout: {stdout}");
    assert!(!stdout.contains("inconsistent"), "stdout: {stdout}");
}

#[test]
fn snapshot_only_skips_synthetic() {
    let out = run(&["verify", &fixture("org.json"), "--snapshot-only", "--format", "json"]);
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).expect("valid JSON");
    assert_eq!(value["snapshot"]["pairs"], 30);
    assert!(value.get("synthetic").is_none());
    assert_eq!(value["snapshot"]["mismatches"].as_array().map(Vec::len), Some(0));
}

#[test]
fn reads_snapshot_from_stdin() {
    let content = std::fs::read(fixture("org.json")).expect("read fixture");
    let mut child = Command::new(dossier_bin())
        .args(["verify", "-", "--snapshot-only"])
        .env_remove("DOSSIER_POLICY_CONFIG")
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .spawn()
        .expect("spawn dossier");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(&content)
        .expect("write stdin");
    let out = child.wait_with_output().expect("wait");
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
}

#[test]
fn oversized_input_is_exit_2() {
    let out = run(&["verify", &fixture("org.json"), "--max-file-size", "16"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("too large"), "stderr: {stderr}");
}

#[test]
fn malformed_snapshot_is_exit_2() {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    f.write_all(br#"{"users": [{"id": "u1", "username": "a", "role": "KING"}]}"#)
        .expect("write");
    let out = run(&["verify", f.path().to_str().expect("path")]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("snapshot rejected"), "stderr: {stderr}");
    assert!(stderr.contains("KING"), "stderr: {stderr}");
}
