//! Integration tests for `dossier roles` and `dossier dashboard`.
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
fn roles_lists_default_tiers() {
    let out = run(&["roles", "--format", "json"]);
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).expect("valid JSON");
    let rows = value.as_array().expect("array");
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0]["role"], "ADVISER");
    assert_eq!(rows[0]["tier"], "full");
    assert_eq!(rows[1]["role"], "PRESIDENT");
    assert_eq!(rows[1]["tier"], "partial");
}

#[test]
fn roles_reflect_policy_config() {
    let mut config = tempfile::NamedTempFile::new().expect("temp file");
    config
        .write_all(br#"{"role_tiers": {"treasurer": "PARTIAL"}}"#)
        .expect("write config");
    let out = run(&[
        "roles",
        "--policy-config",
        config.path().to_str().expect("path"),
    ]);
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let line = stdout
        .lines()
        .find(|l| l.starts_with("TREASURER "))
        .expect("treasurer row");
    assert!(line.ends_with("partial"), "line: {line}");
}

#[test]
fn dashboard_counts_accessible_documents() {
    let out = run(&[
        "dashboard",
        &fixture("org.json"),
        "--user",
        "alice",
        "--now",
        "2026-02-08T00:00:00Z",
        "--format",
        "json",
    ]);
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).expect("valid JSON");
    assert_eq!(value["total"], 3);
    assert_eq!(value["owned"], 2);
    assert_eq!(value["recent"], 3);
    assert_eq!(value["recent_documents"][0]["id"], "d-payroll");
}

#[test]
fn dashboard_human_mentions_window() {
    let out = run(&[
        "dashboard",
        &fixture("org.json"),
        "--user",
        "carol",
        "--now",
        "2026-03-01T00:00:00Z",
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("total:     1"), "stdout: {stdout}");
    assert!(stdout.contains("recent:    0 (last 7 days)"), "stdout: {stdout}");
}
