//! Integration tests for the `hookgate` CLI binary.
//!
//! Argument parsing, config handling and exit codes run without a gateway;
//! the end-to-end cases point the binary at a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `hookgate` binary with env isolation.
///
/// Config and data directories point into `home`, every `HOOKGATE_*`
/// variable is cleared, and retries are disabled so failures are fast.
fn hookgate_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hookgate");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("HOOKGATE_RETRY__MAX_ATTEMPTS", "0")
        .env("HOOKGATE_RETRY__MUTATION_ATTEMPTS", "0")
        .env_remove("HOOKGATE_API_URL")
        .env_remove("HOOKGATE_TIMEOUT_SECS")
        .env_remove("HOOKGATE_CONFIG")
        .env_remove("HOOKGATE_OUTPUT")
        .env_remove("HOOKGATE_TOKEN")
        .env_remove("HOOKGATE_PROVIDER_SECRET")
        .env_remove("HOOKGATE_SIGNING_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn provider_json(name: &str) -> serde_json::Value {
    json!({
        "id": "2f1c6f53-3c55-4d8f-8f38-5f0f3b4f7f10",
        "name": name,
        "secret_key": "s".repeat(32),
        "forwarding_url": "https://a.test/hook",
        "is_active": true,
        "created_at": "2025-02-22T10:30:00Z",
        "updated_at": "2025-02-22T10:30:00Z"
    })
}

/// Run a prepared command off the async runtime.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = hookgate_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    hookgate_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("providers")
            .and(predicate::str::contains("webhooks"))
            .and(predicate::str::contains("logs"))
            .and(predicate::str::contains("health")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    hookgate_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hookgate"));
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    hookgate_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_subcommands_exist() {
    let home = TempDir::new().unwrap();
    hookgate_cmd(home.path())
        .args(["webhooks", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("retry"))
                .and(predicate::str::contains("send-test")),
        );
    hookgate_cmd(home.path())
        .args(["logs", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("export"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_defaults() {
    let home = TempDir::new().unwrap();
    hookgate_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("api_url = \"http://localhost:8000\"")
                .and(predicate::str::contains("timeout_secs = 30")),
        );
}

#[test]
fn test_config_file_and_flag_precedence() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("custom.toml");
    std::fs::write(&file, "api_url = \"https://from-file.test\"\ntimeout_secs = 12\n").unwrap();

    hookgate_cmd(home.path())
        .arg("--config")
        .arg(&file)
        .args(["--timeout", "4", "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://from-file.test")
                .and(predicate::str::contains("timeout_secs = 4")),
        );
}

#[test]
fn test_config_show_json_includes_feature_flags() {
    let home = TempDir::new().unwrap();
    let output = hookgate_cmd(home.path())
        .env("HOOKGATE_FEATURES__ANALYTICS", "true")
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["features"]["analytics"], true);
    assert_eq!(parsed["features"]["error_tracking"], false);
}

#[test]
fn test_invalid_api_url_is_usage_error() {
    let home = TempDir::new().unwrap();
    hookgate_cmd(home.path())
        .args(["--api-url", "not a url", "providers", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("api_url"));
}

#[test]
fn test_invalid_output_format() {
    let home = TempDir::new().unwrap();
    let output = hookgate_cmd(home.path())
        .args(["--output", "yaml", "providers", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("invalid") || text.contains("possible values"), "{text}");
}

// ── Client-side guards ──────────────────────────────────────────────

#[test]
fn test_delete_requires_confirmation() {
    let home = TempDir::new().unwrap();
    hookgate_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "providers", "delete", "stripe"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("requires confirmation"));
}

#[test]
fn test_invalid_provider_rejected_before_network() {
    let home = TempDir::new().unwrap();
    hookgate_cmd(home.path())
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "providers",
            "create",
            "--name",
            "x",
            "--secret",
            "short",
            "--url",
            "https://a.test/hook",
        ])
        .assert()
        .code(2);
}

#[test]
fn test_unreachable_gateway_exit_code() {
    let home = TempDir::new().unwrap();
    hookgate_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "providers", "list"])
        .assert()
        .code(7);
}

#[test]
fn test_health_falls_back_when_unreachable() {
    let home = TempDir::new().unwrap();
    hookgate_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "-o", "plain", "health"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unhealthy"));
}

// ── Against a mock gateway ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_providers_list_json_never_prints_secret() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([provider_json("stripe")])))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut cmd = hookgate_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "-o", "json", "providers", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed[0]["name"], "stripe");
    assert!(!stdout.contains("secret"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_sends_token_and_401_clears_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/providers"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token expired" })))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut login = hookgate_cmd(home.path());
    login.args(["--api-url", &server.uri(), "login", "--token", "tok-123"]);
    assert!(run(login).await.status.success());

    let mut list = hookgate_cmd(home.path());
    list.args(["--api-url", &server.uri(), "providers", "list"]);
    let output = run(list).await;
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Token expired"));

    let token_file = home.path().join("data").join("hookgate").join("token");
    assert!(!token_file.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_prints_notification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/providers"))
        .and(body_partial_json(json!({ "name": "stripe" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(provider_json("stripe")))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut cmd = hookgate_cmd(home.path());
    cmd.args([
        "--api-url",
        &server.uri(),
        "providers",
        "create",
        "--name",
        "stripe",
        "--url",
        "https://a.test/hook",
    ])
    .env("HOOKGATE_PROVIDER_SECRET", "s".repeat(32));
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("✓ Success: Provider \"stripe\" created successfully"), "{stderr}");
    assert!(!String::from_utf8_lossy(&output.stdout).contains(&"s".repeat(32)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_writes_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/logs/export"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"id,event_type\n1,replay_attempt\n".to_vec()))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let out = home.path().join("logs.csv");
    let mut cmd = hookgate_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "logs", "export", "--out"])
        .arg(&out);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "id,event_type\n1,replay_attempt\n"
    );
}
