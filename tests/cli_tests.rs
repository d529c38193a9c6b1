//! End-to-end tests of the `protoroute` binary

mod common;

use common::fixtures::{copy_fixture, fixture_path};
use common::temp_files::{cleanup_temp_dirs, create_temp_dir};
use std::fs;
use std::process::Command;

fn protoroute() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_protoroute"));
    cmd.env_remove("PROTOROUTE_CONFIG")
        .env("PROTOROUTE_LOG_LEVEL", "warn");
    cmd
}

#[test]
fn test_cli_classify_prints_routes() {
    let output = protoroute()
        .args(["classify", "CreateJournalEntry", "ApproveJournalEntry", "not-a-name"])
        .args(["--base-path", "/api/v1/finance"])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "CreateJournalEntry\tcreate\tPOST /api/v1/finance/journal-entries (body: *)",
            "ApproveJournalEntry\taction\tPOST /api/v1/finance/journal-entries/{id}/approve (body: *)",
        ]
    );
}

#[test]
fn test_cli_annotate_then_lint() {
    let dir = create_temp_dir("cli_annotate");
    let proto = copy_fixture("gl.proto", &dir);
    let config = fixture_path("protoroute.toml");

    let status = protoroute()
        .current_dir(&dir)
        .args(["annotate-http", proto.to_str().unwrap()])
        .status()
        .expect("run cli");
    assert!(status.success());

    let status = protoroute()
        .current_dir(&dir)
        .args(["annotate-tags", proto.to_str().unwrap()])
        .arg("--config")
        .arg(&config)
        .status()
        .expect("run cli");
    assert!(status.success());

    let text = fs::read_to_string(&proto).unwrap();
    assert_eq!(text.matches("option (google.api.http)").count(), 7);
    assert!(text.contains("tags: \"Journal Entry Core\""));

    // Second run has nothing to write
    let before = fs::metadata(&proto).unwrap().modified().unwrap();
    let status = protoroute()
        .current_dir(&dir)
        .args(["annotate-http", dir.to_str().unwrap()])
        .status()
        .expect("run cli");
    assert!(status.success());
    assert_eq!(fs::metadata(&proto).unwrap().modified().unwrap(), before);

    let output = protoroute()
        .current_dir(&dir)
        .args(["lint", proto.to_str().unwrap(), "--fail-on-error"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)
        .unwrap()
        .contains("No lint issues found"));

    cleanup_temp_dirs(&[dir]);
}

#[test]
fn test_cli_partition_writes_domain_documents() {
    let dir = create_temp_dir("cli_partition");
    let out = dir.join("domains");

    let status = protoroute()
        .current_dir(&dir)
        .arg("partition")
        .arg(fixture_path("openapi.json"))
        .arg("--out")
        .arg(&out)
        .status()
        .expect("run cli");
    assert!(status.success());

    let mut written: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(written, vec!["auth.json", "finance.json", "sales.json"]);

    let status = protoroute()
        .current_dir(&dir)
        .arg("enrich")
        .arg(&out)
        .status()
        .expect("run cli");
    assert!(status.success());
    let finance = fs::read_to_string(out.join("finance.json")).unwrap();
    assert!(finance.contains("\"BearerAuth\""));

    cleanup_temp_dirs(&[dir]);
}

#[test]
fn test_cli_lint_fail_on_error() {
    let dir = create_temp_dir("cli_lint");

    let output = protoroute()
        .current_dir(&dir)
        .arg("lint")
        .arg(fixture_path("openapi.json"))
        .arg("--errors-only")
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[undefined_tag]"));
    assert!(!stdout.contains("[empty_tag_description]"));

    let status = protoroute()
        .current_dir(&dir)
        .arg("lint")
        .arg(fixture_path("openapi.json"))
        .arg("--fail-on-error")
        .status()
        .expect("run cli");
    assert!(!status.success());

    cleanup_temp_dirs(&[dir]);
}

#[test]
fn test_cli_missing_artifact_fails() {
    let dir = create_temp_dir("cli_missing");
    let status = protoroute()
        .current_dir(&dir)
        .args(["project-gateway", "does-not-exist.yaml"])
        .status()
        .expect("run cli");
    assert!(!status.success());
    cleanup_temp_dirs(&[dir]);
}

#[test]
fn test_cli_lint_continues_past_unparsable_artifact() {
    let dir = create_temp_dir("cli_lint_batch");
    fs::write(dir.join("a_broken.proto"), "service S {\n  rpc GetX(A) returns (B);\n").unwrap();
    copy_fixture("drift.proto", &dir);

    let output = protoroute()
        .current_dir(&dir)
        .arg("lint")
        .arg(&dir)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[route_drift]"));
    assert!(stdout.contains("drift.proto:InvoiceService.GetInvoice"));

    cleanup_temp_dirs(&[dir]);
}
