//! Integration tests for the `lwscout` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! schema-backed commands and error exit codes, all without a live gateway
//! or mDNS traffic.
#![allow(clippy::unwrap_used)]

use std::net::TcpListener;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const TEMPERATURE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<LWM2M>
  <Object ObjectType="MODefinition">
    <Name>Temperature</Name>
    <ObjectID>3303</ObjectID>
    <Resources>
      <Item ID="5700">
        <Name>Sensor Value</Name>
        <Operations>R</Operations>
        <Type>Float</Type>
      </Item>
      <Item ID="5701">
        <Name>Sensor Units</Name>
        <Operations>R</Operations>
        <Type>String</Type>
      </Item>
      <Item ID="5605">
        <Name>Reset Min and Max Measured Values</Name>
        <Operations>E</Operations>
      </Item>
    </Resources>
  </Object>
</LWM2M>"#;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `lwscout` binary with env isolation.
///
/// Clears all `LWSCOUT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn lwscout_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("lwscout");
    cmd.env("HOME", "/tmp/lwscout-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/lwscout-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("LWSCOUT_CONFIG")
        .env_remove("LWSCOUT_REST_PORT")
        .env_remove("LWSCOUT_TIMEOUT")
        .env_remove("LWSCOUT_MODELS")
        .env_remove("LWSCOUT_OUTPUT");
    cmd
}

/// A models directory holding `models/{file}`.
fn models_dir(file: &str, contents: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("models")).unwrap();
    std::fs::write(dir.path().join("models").join(file), contents).unwrap();
    dir
}

fn models_arg(dir: &Path) -> String {
    dir.display().to_string()
}

/// A local port nothing listens on.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = lwscout_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    lwscout_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("LwM2M")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("gateways"))
            .and(predicate::str::contains("resources")),
    );
}

#[test]
fn test_version_flag() {
    lwscout_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lwscout"));
}

#[test]
fn test_invalid_subcommand() {
    let output = lwscout_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success(), "Expected failure for invalid subcommand");
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_duration_is_rejected() {
    lwscout_cmd()
        .args(["devices", "--duration", "soon"])
        .assert()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    lwscout_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    lwscout_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Resource definitions ────────────────────────────────────────────

#[test]
fn test_resources_table() {
    let dir = models_dir("3303.xml", TEMPERATURE);
    lwscout_cmd()
        .args(["resources", "3303", "--models", &models_arg(dir.path())])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Sensor Value")
                .and(predicate::str::contains("5701"))
                .and(predicate::str::contains("Float")),
        );
}

#[test]
fn test_resources_plain_keeps_document_order() {
    let dir = models_dir("3303.xml", TEMPERATURE);
    lwscout_cmd()
        .args(["resources", "3303", "-o", "plain", "--models", &models_arg(dir.path())])
        .assert()
        .success()
        .stdout("5700\n5701\n5605\n");
}

#[test]
fn test_resources_json_from_fallback_asset() {
    let dir = models_dir("3303-1_0.xml", TEMPERATURE);
    let output = lwscout_cmd()
        .args(["resources", "3303", "-o", "json", "--models", &models_arg(dir.path())])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("\"name\": \"Sensor Value\""), "{text}");
    assert!(text.contains("\"operations\": \"E\""), "{text}");
}

#[test]
fn test_resources_missing_model() {
    let dir = tempfile::tempdir().unwrap();
    lwscout_cmd()
        .args(["resources", "9999", "--models", &models_arg(dir.path())])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("No object model for object 9999"));
}

#[test]
fn test_resources_malformed_model() {
    let dir = models_dir("3303.xml", "<LWM2M><Item ID=\"x\"></Item></LWM2M>");
    lwscout_cmd()
        .args(["resources", "3303", "--models", &models_arg(dir.path())])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Malformed object model"));
}

// ── Read / write ────────────────────────────────────────────────────

#[test]
fn test_strict_write_to_read_only_resource_is_refused() {
    let dir = models_dir("3303.xml", TEMPERATURE);
    lwscout_cmd()
        .args([
            "write", "127.0.0.1", "dev1", "3303", "0", "5700", "21.5", "--strict", "--models",
            &models_arg(dir.path()),
        ])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("does not allow write"));
}

#[test]
fn test_strict_read_of_unknown_resource() {
    let dir = models_dir("3303.xml", TEMPERATURE);
    lwscout_cmd()
        .args([
            "read", "127.0.0.1", "dev1", "3303", "0", "1234", "--strict", "--models",
            &models_arg(dir.path()),
        ])
        .assert()
        .code(4);
}

#[test]
fn test_read_unreachable_gateway() {
    let port = closed_port().to_string();
    lwscout_cmd()
        .args(["read", "127.0.0.1", "dev1", "3303", "0", "5700", "--rest-port", &port])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not connect to gateway"));
}

#[test]
fn test_zero_rest_port_is_a_usage_error() {
    lwscout_cmd()
        .args(["read", "127.0.0.1", "dev1", "3303", "0", "5700", "--rest-port", "0"])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lwscout.toml");
    lwscout_cmd()
        .args(["config", "path", "--config", &path.display().to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("lwscout.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lwscout.toml").display().to_string();

    lwscout_cmd().args(["config", "init", "--config", &path]).assert().success();

    lwscout_cmd()
        .args(["config", "show", "--config", &path])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[gateway]")
                .and(predicate::str::contains("rest_port = 8088"))
                .and(predicate::str::contains("name_filter = \"wakaama-lwm2m\"")),
        );
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lwscout.toml");
    std::fs::write(&path, "[gateway]\nrest_port = 9000\n").unwrap();
    let path = path.display().to_string();

    lwscout_cmd()
        .args(["config", "init", "--config", &path])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("--force"));

    lwscout_cmd()
        .args(["config", "init", "--force", "--config", &path])
        .assert()
        .success();
}

#[test]
fn test_config_file_output_default_applies() {
    let models = models_dir("3303.xml", TEMPERATURE);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lwscout.toml");
    std::fs::write(&path, "[defaults]\noutput = \"plain\"\n").unwrap();

    lwscout_cmd()
        .args([
            "resources", "3303", "--config", &path.display().to_string(), "--models",
            &models_arg(models.path()),
        ])
        .assert()
        .success()
        .stdout("5700\n5701\n5605\n");
}

#[test]
fn test_config_file_invalid_output_is_a_usage_error() {
    let models = models_dir("3303.xml", TEMPERATURE);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lwscout.toml");
    std::fs::write(&path, "[defaults]\noutput = \"xml\"\n").unwrap();

    lwscout_cmd()
        .args([
            "resources", "3303", "--config", &path.display().to_string(), "--models",
            &models_arg(models.path()),
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("defaults.output"));
}
