//! NDJSON fixture helpers for integration tests.

#![allow(dead_code)]

use tempfile::TempDir;
use wiremock::ResponseTemplate;

/// Creates a temp LOCHAT_HOME directory for test isolation.
pub fn temp_lochat_home() -> TempDir {
    TempDir::new().expect("create temp lochat home")
}

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Wraps an NDJSON body in a streaming response.
pub fn ndjson_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/x-ndjson")
        .set_body_string(body.to_string())
}

/// Builds a chat response body: one record per token, then a done record.
pub fn chat_ndjson(tokens: &[&str]) -> String {
    let mut body = String::new();
    for token in tokens {
        body.push_str(&format!(
            "{{\"message\":{{\"role\":\"assistant\",\"content\":\"{}\"}},\"done\":false}}\n",
            escape_json(token)
        ));
    }
    body.push_str("{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n");
    body
}

/// Builds a generate response body: one record per token, then a done record.
pub fn generate_ndjson(tokens: &[&str]) -> String {
    let mut body = String::new();
    for token in tokens {
        body.push_str(&format!(
            "{{\"response\":\"{}\",\"done\":false}}\n",
            escape_json(token)
        ));
    }
    body.push_str("{\"response\":\"\",\"done\":true}\n");
    body
}

/// Builds a pull response body ending in the success record.
pub fn pull_ndjson() -> String {
    concat!(
        "{\"status\":\"pulling manifest\"}\n",
        "{\"status\":\"downloading\",\"completed\":512,\"total\":1024}\n",
        "{\"status\":\"downloading\",\"completed\":1024,\"total\":1024}\n",
        "{\"status\":\"verifying sha256 digest\"}\n",
        "{\"status\":\"success\"}\n",
    )
    .to_string()
}

/// Escape special characters for JSON string embedding.
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
