//! CLI tests for the `cco` binary
//!
//! Only commands that need no network are exercised here.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `cco` isolated from the user's config, data dir and credential
fn cco(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cco").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env_remove("HF_API_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn write_artifacts(dir: &TempDir) {
    std::fs::write(
        dir.path().join("project_profile.json"),
        r#"{"name": "Tutor App", "budget_per_month": 4000, "description": "Online tutoring"}"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("mock_billing.json"),
        r#"[{"service": "Compute", "cost": 3000}, {"service": "Storage", "cost": 1200}, {"service": "Network", "cost": 400}]"#,
    )
    .unwrap();
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    cco(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("profile"))
        .stdout(predicate::str::contains("recommend"))
        .stdout(predicate::str::contains("HF_API_TOKEN"));
}

#[test]
fn test_report_without_saved_report_fails() {
    let dir = TempDir::new().unwrap();
    cco(&dir)
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cost_optimization_report.json"));
}

#[test]
fn test_analyze_saved_artifacts_as_json() {
    let dir = TempDir::new().unwrap();
    write_artifacts(&dir);

    let output = cco(&dir).args(["analyze", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total_cost"], 4600.0);
    assert_eq!(summary["variance"], 600.0);
    assert_eq!(summary["is_over_budget"], true);
    assert_eq!(summary["top_services"][0]["service"], "Compute");
}

#[test]
fn test_analyze_honors_output_dir() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_artifacts(&out);

    cco(&dir)
        .args(["analyze", "--output-dir"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("over budget"));
}

#[test]
fn test_run_without_credential_fails() {
    let dir = TempDir::new().unwrap();
    cco(&dir)
        .args(["run", "a food delivery app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HF_API_TOKEN"));
}

#[test]
fn test_credential_read_from_dotenv() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".env"), "HF_API_TOKEN=from-dotenv\n").unwrap();
    // Nothing listens on the discard port; one quick attempt
    std::fs::write(
        dir.path().join(".cco.yml"),
        "llm:\n  base-url: http://127.0.0.1:9\n  timeout-ms: 500\nretry:\n  max-attempts: 1\n  delay-ms: 0\n",
    )
    .unwrap();

    cco(&dir)
        .args(["profile", "a food delivery app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key not found").not())
        .stderr(predicate::str::contains("profile stage failed"));
}

#[test]
fn test_help_shows_configured_credential_variable() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".cco.yml"), "llm:\n  api-key-env: CCO_CLI_TEST_TOKEN\n").unwrap();

    cco(&dir)
        .arg("--help")
        .env_remove("CCO_CLI_TEST_TOKEN")
        .assert()
        .success()
        .stdout(predicate::str::contains("CCO_CLI_TEST_TOKEN"))
        .stdout(predicate::str::contains("HF_API_TOKEN").not());
}

#[test]
fn test_broken_local_config_is_reported() {
    let dir = TempDir::new().unwrap();
    write_artifacts(&dir);
    std::fs::write(dir.path().join(".cco.yml"), "pipeline:\n  default-budget: plenty\n").unwrap();

    cco(&dir)
        .arg("analyze")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config from .cco.yml"));
}
