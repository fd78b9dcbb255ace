//! Integration tests for the ask command against a mock backend.

mod fixtures;

use assert_cmd::cargo::cargo_bin_cmd;
use fixtures::{can_bind_localhost, generate_ndjson, ndjson_response, temp_lochat_home};
use predicates::prelude::*;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_ask_streams_tokens_to_stdout() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let lochat_home = temp_lochat_home();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({
            "prompt": "say hello",
            "stream": true,
        })))
        .respond_with(ndjson_response(&generate_ndjson(&["Hel", "lo"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("lochat")
        .env("LOCHAT_HOME", lochat_home.path())
        .env("OLLAMA_BASE_URL", mock_server.uri())
        .args(["ask", "say hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello"));
}

#[tokio::test]
async fn test_ask_model_override_reaches_the_wire() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let lochat_home = temp_lochat_home();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({
            "model": "qwen2.5",
        })))
        .respond_with(ndjson_response(&generate_ndjson(&["ok"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("lochat")
        .env("LOCHAT_HOME", lochat_home.path())
        .env("OLLAMA_BASE_URL", mock_server.uri())
        .args(["--model", "qwen2.5", "ask", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[tokio::test]
async fn test_ask_surfaces_http_error_body() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let lochat_home = temp_lochat_home();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"error":"model 'nope' not found"}"#),
        )
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("lochat")
        .env("LOCHAT_HOME", lochat_home.path())
        .env("OLLAMA_BASE_URL", mock_server.uri())
        .args(["ask", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("model 'nope' not found"));
}

#[tokio::test]
async fn test_ask_fails_on_midstream_error_record() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let lochat_home = temp_lochat_home();
    let mock_server = MockServer::start().await;

    let body = concat!(
        "{\"response\":\"part\",\"done\":false}\n",
        "{\"error\":\"out of memory\"}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ndjson_response(body))
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("lochat")
        .env("LOCHAT_HOME", lochat_home.path())
        .env("OLLAMA_BASE_URL", mock_server.uri())
        .args(["ask", "hi"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("part"))
        .stderr(predicate::str::contains("out of memory"));
}
