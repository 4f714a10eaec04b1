//! Integration tests for the `moorfleet` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! configuration handling, and error exit codes, all without a live
//! MoorFleet backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

const NO_CONFIG: &str = "/tmp/moorfleet-cli-test-nonexistent/config.toml";

/// Build a [`Command`] for the `moorfleet` binary with env isolation.
///
/// Clears all `MOORFLEET_*` env vars and points the config file at a
/// nonexistent path so tests never touch the user's real configuration.
fn moorfleet_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("moorfleet");
    cmd.env("HOME", "/tmp/moorfleet-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/moorfleet-cli-test-nonexistent")
        .env("MOORFLEET_CONFIG", NO_CONFIG)
        .env_remove("MOORFLEET_PROFILE")
        .env_remove("MOORFLEET_BACKEND")
        .env_remove("MOORFLEET_OUTPUT")
        .env_remove("MOORFLEET_INSECURE")
        .env_remove("MOORFLEET_TIMEOUT")
        .env_remove("MOORFLEET_DEFAULT_PROFILE")
        .env_remove("MOORFLEET_DEFAULTS__RANGE")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn write_config(text: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, text).unwrap();
    (dir, path)
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = moorfleet_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    moorfleet_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("mooring fleet")
            .and(predicate::str::contains("units"))
            .and(predicate::str::contains("kpis"))
            .and(predicate::str::contains("alarms"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    moorfleet_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("moorfleet"));
}

#[test]
fn test_alarms_help_lists_lifecycle_actions() {
    moorfleet_cmd()
        .args(["alarms", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("ack")
                .and(predicate::str::contains("clear"))
                .and(predicate::str::contains("list")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    moorfleet_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    moorfleet_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("moorfleet"));
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_invalid_range_is_a_usage_error() {
    let output = moorfleet_cmd()
        .args(["units", "history", "1", "--range", "2weeks"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("invalid time range"), "Unexpected output:\n{text}");
}

#[test]
fn test_range_is_case_sensitive_selector() {
    let output = moorfleet_cmd()
        .args(["kpis", "--range", "1D"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_output_format() {
    moorfleet_cmd()
        .args(["units", "list", "-o", "xml"])
        .assert()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_backend_reports_config_path() {
    let output = moorfleet_cmd().args(["units", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("No backend configured"), "Unexpected output:\n{text}");
    assert!(text.contains(NO_CONFIG), "Expected config path in:\n{text}");
}

#[test]
fn test_unknown_profile_lists_available() {
    let (_dir, path) = write_config(
        r#"
[profiles.harbour]
backend = "http://10.0.0.5:5000"
"#,
    );
    let output = moorfleet_cmd()
        .env("MOORFLEET_CONFIG", &path)
        .args(["-p", "lab", "alarms", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("Profile 'lab' not found"), "Unexpected output:\n{text}");
    assert!(text.contains("harbour"), "Expected available profiles in:\n{text}");
}

#[test]
fn test_invalid_backend_url_is_a_usage_error() {
    let output = moorfleet_cmd()
        .args(["--backend", "not a url", "units", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("invalid URL"), "Unexpected output:\n{text}");
}

#[test]
fn test_zero_refresh_period_is_rejected() {
    let (_dir, path) = write_config(
        r#"
[profiles.default]
backend = "http://10.0.0.5:5000"
fleet_refresh_secs = 0
"#,
    );
    moorfleet_cmd()
        .env("MOORFLEET_CONFIG", &path)
        .args(["watch"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("fleet_refresh_secs"));
}

// ── Config subcommands ──────────────────────────────────────────────

#[test]
fn test_config_path_honours_override() {
    moorfleet_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(NO_CONFIG));
}

#[test]
fn test_config_show_renders_profiles() {
    let (_dir, path) = write_config(
        r#"
default_profile = "harbour"

[profiles.harbour]
backend = "http://10.0.0.5:5000"
unit_refresh_secs = 5
"#,
    );
    moorfleet_cmd()
        .env("MOORFLEET_CONFIG", &path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://10.0.0.5:5000")
                .and(predicate::str::contains("unit_refresh_secs = 5")),
        );
}

#[test]
fn test_config_show_json() {
    let (_dir, path) = write_config(
        r#"
[profiles.default]
backend = "http://10.0.0.5:5000"
"#,
    );
    let output = moorfleet_cmd()
        .env("MOORFLEET_CONFIG", &path)
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["profiles"]["default"]["backend"], "http://10.0.0.5:5000");
    assert_eq!(value["defaults"]["range"], "1day");
}

#[test]
fn test_config_init_refuses_without_terminal() {
    moorfleet_cmd()
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("needs a terminal"));
}

// ── Alarm actions ───────────────────────────────────────────────────

#[test]
fn test_clear_requires_confirmation_when_not_interactive() {
    moorfleet_cmd()
        .args(["--backend", "http://127.0.0.1:9", "alarms", "clear", "4"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("requires confirmation"));
}

// ── Connection errors ───────────────────────────────────────────────

#[test]
fn test_unreachable_backend_exits_with_connection_code() {
    moorfleet_cmd()
        .args(["--backend", "http://127.0.0.1:9", "--timeout", "5", "units", "list"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not reach the backend"));
}
