//! E2E tests for the llmroute binary.
//!
//! Every command runs against an isolated config path so the developer's
//! own `~/.config/llmroute/config.toml` never leaks in.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use llmroute::test_utils::TestDir;

use common::fixtures::fixture_path;

fn llmroute(dir: &TestDir) -> Command {
    let mut cmd = Command::cargo_bin("llmroute").unwrap();
    cmd.env("LLMROUTE_CONFIG", dir.file_path("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("LLMROUTE_STRATEGY")
        .env_remove("LLMROUTE_DAILY_LIMIT")
        .env_remove("LLMROUTE_MONTHLY_LIMIT")
        .env_remove("LLMROUTE_API_KEY")
        .env_remove("LLMROUTE_LOG")
        .env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// =============================================================================
// route
// =============================================================================

#[test]
fn route_json_uses_default_balanced_strategy() {
    let dir = TestDir::new();
    let json = json_stdout(llmroute(&dir).args(["route", "--json", "hello there"]));

    assert_eq!(json["schemaVersion"], "llmroute.v1");
    assert_eq!(json["command"], "route");
    let decision = &json["data"]["decision"];
    assert_eq!(decision["provider"], "anthropic");
    assert_eq!(decision["reason"], "balanced");
    assert_eq!(decision["sensitive"], false);
    assert!(json["data"].get("candidates").is_none());
}

#[test]
fn route_human_shows_provider_and_reason() {
    let dir = TestDir::new();
    llmroute(&dir)
        .args(["route", "--strategy", "cheapest", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("local (cheapest)"));
}

#[test]
fn route_sensitive_goes_local() {
    let dir = TestDir::new();
    let json = json_stdout(llmroute(&dir).args([
        "--json",
        "route",
        "-s",
        "fastest",
        "my api_key is 1234",
    ]));
    assert_eq!(json["data"]["decision"]["provider"], "local");
    assert_eq!(json["data"]["decision"]["reason"], "sensitive_content");
}

#[test]
fn route_explain_lists_candidates() {
    let dir = TestDir::new();
    let json = json_stdout(llmroute(&dir).args(["--json", "route", "--explain", "-s", "fastest", "hi"]));
    let names: Vec<&str> = json["data"]["candidates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["provider"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["openai", "anthropic", "local"]);
}

#[test]
fn route_daily_limit_flag_applies() {
    let dir = TestDir::new();
    let long = "word ".repeat(2000);
    let json = json_stdout(llmroute(&dir).args([
        "--json",
        "route",
        "-s",
        "fastest",
        "--daily-limit",
        "0.01",
        long.as_str(),
    ]));
    // 2500 tokens: openai 0.075 and anthropic 0.0375 are over 0.01.
    assert_eq!(json["data"]["decision"]["provider"], "local");
    assert_eq!(json["data"]["decision"]["reason"], "fastest");
}

#[test]
fn route_unknown_strategy_exits_with_config_code() {
    let dir = TestDir::new();
    llmroute(&dir)
        .args(["route", "--strategy", "random", "hi"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("error[ROUTE-C001]"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn route_without_messages_is_invalid() {
    let dir = TestDir::new();
    llmroute(&dir)
        .arg("route")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("ROUTE-Q001"));
}

#[test]
fn json_errors_are_structured() {
    let dir = TestDir::new();
    let output = llmroute(&dir)
        .args(["--json", "route", "-s", "nope", "hi"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error_code"], "ROUTE-C001");
    assert_eq!(err["exit_code"], 3);
    assert_eq!(err["is_retryable"], false);
}

#[tokio::test(flavor = "multi_thread")]
async fn route_send_forwards_to_provider_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer k-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "llama3",
            "choices": [{"message": {"role": "assistant", "content": "pong"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TestDir::new();
    dir.create_file(
        "config.toml",
        &format!("[providers.local]\nendpoint = \"{}/v1\"\n", server.uri()),
    );
    let mut cmd = llmroute(&dir);
    cmd.env("LLMROUTE_API_KEY", "k-123")
        .args(["route", "--send", "-s", "cheapest", "ping"]);

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Reply from llama3"), "{stdout}");
    assert!(stdout.contains("pong"));
}

#[test]
fn route_send_without_endpoint_fails() {
    let dir = TestDir::new();
    llmroute(&dir)
        .args(["route", "--send", "-s", "cheapest", "ping"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("local"));
}

// =============================================================================
// Other commands
// =============================================================================

#[test]
fn check_sensitive_lists_categories() {
    let dir = TestDir::new();
    llmroute(&dir)
        .args(["check-sensitive", "hello", "my password is 123-45-6789"])
        .assert()
        .success()
        .stdout(predicate::str::contains("credential_keyword (message 2)"))
        .stdout(predicate::str::contains("ssn (message 2)"));
}

#[test]
fn check_sensitive_json_for_plain_text() {
    let dir = TestDir::new();
    let json = json_stdout(llmroute(&dir).args(["--json", "check-sensitive", "what time is it"]));
    assert_eq!(json["data"]["sensitive"], false);
    assert_eq!(json["data"]["matches"].as_array().unwrap().len(), 0);
}

#[test]
fn providers_lists_builtins() {
    let dir = TestDir::new();
    let json = json_stdout(llmroute(&dir).args(["providers", "--json"]));
    let providers = json["data"]["providers"].as_array().unwrap();
    assert_eq!(providers.len(), 3);
    assert!(json["data"].get("probes").is_none());
}

#[test]
fn providers_probe_reports_reachability() {
    let dir = TestDir::new();
    let json = json_stdout(llmroute(&dir).args(["providers", "--probe", "--json"]));
    // Built-ins have no health URL, so every probe passes.
    let probes = json["data"]["probes"].as_array().unwrap();
    assert_eq!(probes.len(), 3);
    assert!(probes.iter().all(|p| p["healthy"] == true));
}

#[test]
fn config_reports_sources() {
    let dir = TestDir::new();
    let config = fixture_path("config_full.toml");
    let json = json_stdout(llmroute(&dir).args([
        "config",
        "--json",
        "--config",
        config.to_str().unwrap(),
    ]));
    let data = &json["data"];
    assert_eq!(data["strategy"], "cheapest");
    assert_eq!(data["configExists"], true);
    assert_eq!(data["sources"]["strategy"], "config_file");
    assert_eq!(data["sources"]["configPath"], "cli");
    assert_eq!(data["health"]["intervalSeconds"], 10);
}

#[test]
fn config_env_strategy_beats_file() {
    let dir = TestDir::new();
    let config = fixture_path("config_full.toml");
    llmroute(&dir)
        .env("LLMROUTE_STRATEGY", "reliability")
        .args(["config", "--config", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("reliability (environment variable)"));
}

#[test]
fn broken_config_file_exits_3() {
    let dir = TestDir::new();
    llmroute(&dir)
        .env("LLMROUTE_CONFIG", fixture_path("config_broken.toml"))
        .arg("providers")
        .assert()
        .code(3);
}

#[test]
fn simulate_summarizes_batch() {
    let dir = TestDir::new();
    let requests = fixture_path("requests.jsonl");
    let json = json_stdout(llmroute(&dir).args([
        "--json",
        "simulate",
        "-s",
        "cheapest",
        requests.to_str().unwrap(),
    ]));
    let data = &json["data"];
    assert_eq!(data["summary"]["totalRequests"], 5);
    assert_eq!(data["reasons"]["sensitive_content"], 2);
    assert_eq!(data["reasons"]["cheapest"], 1);
}

#[test]
fn simulate_reads_stdin() {
    let dir = TestDir::new();
    llmroute(&dir)
        .args(["simulate", "-"])
        .write_stdin("{\"messages\":[{\"role\":\"user\",\"content\":\"hi\"}]}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Requests:     1"));
}

#[test]
fn simulate_rejects_malformed_line() {
    let dir = TestDir::new();
    llmroute(&dir)
        .args(["simulate", "-"])
        .write_stdin("{\"messages\":[]}\n{oops\n")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn no_command_prints_quickstart() {
    let dir = TestDir::new();
    llmroute(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("QUICK START"));
}

#[test]
fn version_flag() {
    let dir = TestDir::new();
    llmroute(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
