//! Integration tests for `dossier list`.
#![allow(clippy::expect_used)]

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

fn list_json(user: &str, extra: &[&str]) -> serde_json::Value {
    let file = fixture("org.json");
    let mut args = vec!["list", file.as_str(), "--user", user, "--format", "json"];
    args.extend_from_slice(extra);
    let out = run(&args);
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    serde_json::from_slice(&out.stdout).expect("valid JSON")
}

fn ids(value: &serde_json::Value) -> Vec<String> {
    value["documents"]
        .as_array()
        .expect("documents array")
        .iter()
        .map(|d| d["id"].as_str().expect("id").to_owned())
        .collect()
}

#[test]
fn regular_without_documents_sees_only_public() {
    let value = list_json("carol", &[]);
    assert_eq!(value["total"], 1);
    assert_eq!(ids(&value), vec!["d-minutes"]);
}

#[test]
fn owner_sees_own_and_public_newest_first() {
    let value = list_json("alice", &[]);
    assert_eq!(ids(&value), vec!["d-payroll", "d-minutes", "d-budget"]);
}

#[test]
fn shared_document_appears_for_share_target() {
    let value = list_json("bob", &[]);
    assert_eq!(ids(&value), vec!["d-minutes", "d-budget"]);
}

#[test]
fn archived_document_never_listed() {
    for user in ["adviser", "bob", "root"] {
        let value = list_json(user, &[]);
        assert!(!ids(&value).contains(&"d-old".to_owned()), "user {user}");
    }
}

#[test]
fn filters_narrow_the_accessible_set() {
    let value = list_json("adviser", &["--query", "BUDGET"]);
    assert_eq!(ids(&value), vec!["d-minutes", "d-budget"]);

    let value = list_json("adviser", &["--category", "finance", "--classification", "restricted"]);
    assert_eq!(ids(&value), vec!["d-payroll"]);

    let value = list_json("adviser", &["--section", "POLICIES"]);
    assert_eq!(ids(&value), vec!["d-policy"]);

    let value = list_json("adviser", &["--owner", "ALI"]);
    assert_eq!(ids(&value), vec!["d-payroll", "d-budget"]);

    let value = list_json("adviser", &["--from", "2026-02-04", "--to", "2026-02-06"]);
    assert_eq!(ids(&value), vec!["d-minutes"]);
}

#[test]
fn pagination_keeps_total() {
    let value = list_json("adviser", &["--offset", "1", "--limit", "2"]);
    assert_eq!(value["total"], 4);
    assert_eq!(ids(&value), vec!["d-minutes", "d-budget"]);
}

#[test]
fn human_output_has_range_header() {
    let out = run(&["list", &fixture("org.json"), "--user", "carol"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("showing 1-1 of 1"), "stdout: {stdout}");
    assert!(stdout.contains("d-minutes"), "stdout: {stdout}");
}

#[test]
fn invalid_section_is_exit_2() {
    let out = run(&["list", &fixture("org.json"), "--user", "carol", "--section", "bad key"]);
    assert_eq!(out.status.code(), Some(2));
}
