#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::wildcard_enum_match_arm)]

use clap::{CommandFactory, Parser};

use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("arguments should parse")
}

/// The root help output must contain all top-level subcommand names.
#[test]
fn root_help_lists_all_subcommands() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());
    for name in ["check", "list", "predicate", "verify", "roles", "dashboard"] {
        assert!(help.contains(name), "root help should mention '{name}'");
    }
}

#[test]
fn root_help_lists_global_flags() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());
    for flag in [
        "--format",
        "--quiet",
        "--verbose",
        "--policy-config",
        "--max-file-size",
        "--no-color",
    ] {
        assert!(help.contains(flag), "root help should mention '{flag}'");
    }
}

#[test]
fn clap_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn check_requires_user_and_document() {
    assert!(Cli::try_parse_from(["dossier", "check", "org.json"]).is_err());
    assert!(Cli::try_parse_from(["dossier", "check", "org.json", "--user", "u1"]).is_err());

    let cli = parse(&["dossier", "check", "org.json", "-u", "u1", "-d", "d1"]);
    match cli.command {
        Command::Check { subject, document } => {
            assert_eq!(subject.user, "u1");
            assert_eq!(document, "d1");
            assert!(matches!(subject.file, PathOrStdin::Path(_)));
        }
        _ => panic!("expected check"),
    }
}

#[test]
fn dash_means_stdin() {
    let cli = parse(&["dossier", "predicate", "-", "--user", "u1", "--sql"]);
    match cli.command {
        Command::Predicate { subject, sql } => {
            assert!(matches!(subject.file, PathOrStdin::Stdin));
            assert!(sql);
        }
        _ => panic!("expected predicate"),
    }
}

#[test]
fn list_parses_typed_filters() {
    let cli = parse(&[
        "dossier",
        "list",
        "org.json",
        "--user",
        "alice",
        "--classification",
        "CONFIDENTIAL",
        "--from",
        "2026-02-01",
        "--limit",
        "5",
    ]);
    match cli.command {
        Command::List {
            classification,
            from,
            limit,
            offset,
            ..
        } => {
            assert_eq!(classification, Some(Classification::Confidential));
            assert_eq!(from, NaiveDate::from_ymd_opt(2026, 2, 1));
            assert_eq!(limit, 5);
            assert_eq!(offset, 0);
        }
        _ => panic!("expected list"),
    }
}

#[test]
fn unknown_classification_is_a_parse_error() {
    let result = Cli::try_parse_from([
        "dossier",
        "list",
        "org.json",
        "--user",
        "u1",
        "--classification",
        "secret",
    ]);
    assert!(result.is_err());
}

#[test]
fn quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["dossier", "roles", "--quiet", "--verbose"]).is_err());
}

#[test]
fn global_flags_apply_after_subcommand() {
    let cli = parse(&["dossier", "roles", "--format", "json"]);
    assert_eq!(cli.format, OutputFormat::Json);
    assert!(matches!(cli.command, Command::Roles));
}

#[test]
fn dashboard_accepts_rfc3339_now() {
    let cli = parse(&[
        "dossier",
        "dashboard",
        "org.json",
        "--user",
        "u1",
        "--now",
        "2026-02-10T00:00:00Z",
    ]);
    match cli.command {
        Command::Dashboard { now, .. } => assert!(now.is_some()),
        _ => panic!("expected dashboard"),
    }
}
