#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Unit tests for CLI commands

use crate::cli::{run_cli, Cli, Commands};
use crate::proto::DocsMode;
use clap::Parser;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_lint_command_exists() {
    let cli = Cli::try_parse_from(["protoroute", "lint", "gl.proto"]).unwrap();

    match cli.command {
        Commands::Lint { paths, .. } => {
            assert_eq!(paths[0].to_string_lossy(), "gl.proto");
        }
        _ => panic!("Expected Lint command"),
    }
}

#[test]
fn test_lint_command_with_flags() {
    let cli = Cli::try_parse_from([
        "protoroute",
        "lint",
        "gl.proto",
        "routes.yaml",
        "--fail-on-error",
        "--errors-only",
    ])
    .unwrap();

    match cli.command {
        Commands::Lint {
            paths,
            fail_on_error,
            errors_only,
        } => {
            assert_eq!(paths.len(), 2);
            assert!(fail_on_error);
            assert!(errors_only);
        }
        _ => panic!("Expected Lint command"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "protoroute",
        "annotate-http",
        "proto/",
        "--config",
        "custom.toml",
        "-v",
        "--base-path",
        "/api/v1/finance",
    ])
    .unwrap();

    assert!(cli.verbose);
    assert_eq!(cli.config.unwrap().to_string_lossy(), "custom.toml");
    match cli.command {
        Commands::AnnotateHttp {
            base_path, dry_run, ..
        } => {
            assert_eq!(base_path.as_deref(), Some("/api/v1/finance"));
            assert!(!dry_run);
        }
        _ => panic!("Expected AnnotateHttp command"),
    }
}

#[test]
fn test_toggle_docs_mode() {
    let cli = Cli::try_parse_from(["protoroute", "toggle-docs", "disable", "a.proto"]).unwrap();
    match cli.command {
        Commands::ToggleDocs { mode, .. } => assert_eq!(mode, DocsMode::Disable),
        _ => panic!("Expected ToggleDocs command"),
    }

    assert!(Cli::try_parse_from(["protoroute", "toggle-docs", "sideways", "a.proto"]).is_err());
}

#[test]
fn test_paths_are_required() {
    assert!(Cli::try_parse_from(["protoroute", "annotate-tags"]).is_err());
    assert!(Cli::try_parse_from(["protoroute", "partition", "openapi.json"]).is_err());
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["protoroute", "annotate-http", "a.proto", "--dry-run"],
        vec!["protoroute", "annotate-tags", "a.proto", "--service-tags"],
        vec!["protoroute", "toggle-docs", "enable", "proto/"],
        vec!["protoroute", "project-gateway", "routes.yaml"],
        vec!["protoroute", "partition", "openapi.json", "--out", "out"],
        vec!["protoroute", "enrich", "gl.json", "ap.json"],
        vec!["protoroute", "classify", "CreateJournalEntry"],
        vec!["protoroute", "lint", "gl.proto"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

#[test]
fn test_run_annotate_http_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gl.proto");
    let source = "syntax = \"proto3\";\npackage finance.gl.v1;\nservice S {\n  rpc GetJournalEntry(A) returns (B);\n}\n";
    fs::write(&path, source).unwrap();

    let cli = Cli::try_parse_from([
        "protoroute",
        "annotate-http",
        path.to_str().unwrap(),
        "--dry-run",
    ])
    .unwrap();
    run_cli(cli).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), source);

    let cli = Cli::try_parse_from(["protoroute", "annotate-http", path.to_str().unwrap()]).unwrap();
    run_cli(cli).unwrap();
    let annotated = fs::read_to_string(&path).unwrap();
    assert!(annotated.contains("get: \"/api/v1/finance/gl/journal-entries/{id}\""));
}

#[test]
fn test_run_batch_reports_failures_after_processing_all() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.proto");
    let bad = dir.path().join("bad.proto");
    fs::write(&good, "syntax = \"proto3\";\nservice S {\n  rpc CreateOrder(A) returns (B);\n}\n").unwrap();
    fs::write(&bad, "service S {\n  rpc CreateOrder(A) returns (B);\n").unwrap();

    let cli = Cli::try_parse_from(["protoroute", "annotate-http", dir.path().to_str().unwrap()])
        .unwrap();
    assert!(run_cli(cli).is_err());
    assert!(fs::read_to_string(&good).unwrap().contains("google.api.http"));
}

#[test]
fn test_run_with_missing_explicit_config_fails() {
    let cli = Cli::try_parse_from([
        "protoroute",
        "classify",
        "CreateJournalEntry",
        "--config",
        "/definitely/not/here.toml",
    ])
    .unwrap();
    assert!(run_cli(cli).is_err());
}

#[test]
fn test_run_missing_input_does_not_stop_the_batch() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.proto");
    let missing = dir.path().join("missing.proto");
    fs::write(&good, "syntax = \"proto3\";\nservice S {\n  rpc CreateOrder(A) returns (B);\n}\n").unwrap();

    let cli = Cli::try_parse_from([
        "protoroute",
        "annotate-http",
        good.to_str().unwrap(),
        missing.to_str().unwrap(),
    ])
    .unwrap();
    let err = run_cli(cli).unwrap_err();
    assert!(err.to_string().contains("1 artifact(s) failed"));
    assert!(fs::read_to_string(&good).unwrap().contains("google.api.http"));
    assert!(!missing.exists());
}
