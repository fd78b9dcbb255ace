//! Streaming HTTP client for Ollama-compatible backends.
//!
//! All three streaming endpoints speak newline-delimited JSON over a chunked
//! response body. The client checks the HTTP status before handing the byte
//! stream to the record decoder; opening the connection is the caller's only
//! awaited setup step.

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde::Serialize;

use super::error::{StreamError, StreamResult};
use super::ndjson::RecordStream;
use crate::core::message::Message;

/// Standard User-Agent header for lochat API requests.
pub const USER_AGENT: &str = concat!("lochat/", env!("CARGO_PKG_VERSION"));

/// Boxed byte stream from an open response body.
pub type ByteStream = BoxStream<'static, reqwest::Result<Bytes>>;

/// Decoded record stream handed to the session runner.
pub type BackendRecords = RecordStream<ByteStream>;

/// Sampling options forwarded to the backend's `options` object.
///
/// Unset fields are omitted from the request so the backend keeps its own
/// defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat_tau: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat_eta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_thread: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a GenerateOptions>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a GenerateOptions>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

/// Ollama API client.
pub struct OllamaClient {
    base_url: String,
    http: reqwest::Client,
}

impl OllamaClient {
    /// Creates a client for the given base URL (e.g. `http://localhost:11434`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            http: reqwest::Client::new(),
        }
    }

    /// Creates a client with a connection timeout.
    ///
    /// The timeout covers connection setup only; an open stream is never
    /// timed out by the client.
    pub fn with_connect_timeout(
        base_url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> StreamResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| StreamError::transport(format!("failed to build http client: {e}")))?;
        Ok(Self {
            base_url: normalize_base_url(base_url),
            http,
        })
    }

    /// Streams a chat completion over the full message history.
    pub async fn chat_stream(
        &self,
        model: &str,
        history: &[Message],
        options: Option<&GenerateOptions>,
    ) -> StreamResult<BackendRecords> {
        let request = ChatRequest {
            model,
            messages: history
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            options,
            stream: true,
        };
        self.send_streaming_request("/api/chat", &request).await
    }

    /// Streams a completion for a single prompt (the generate endpoint).
    pub async fn generate_stream(
        &self,
        model: &str,
        prompt: &str,
        options: Option<&GenerateOptions>,
    ) -> StreamResult<BackendRecords> {
        let request = GenerateRequest {
            model,
            prompt,
            options,
            stream: true,
        };
        self.send_streaming_request("/api/generate", &request).await
    }

    /// Streams download progress for a model pull.
    pub async fn pull_stream(&self, name: &str) -> StreamResult<BackendRecords> {
        let request = PullRequest { name, stream: true };
        self.send_streaming_request("/api/pull", &request).await
    }

    async fn send_streaming_request<T: Serialize>(
        &self,
        path: &str,
        request: &T,
    ) -> StreamResult<BackendRecords> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("user-agent", USER_AGENT)
            .json(request)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(StreamError::http_status(status.as_u16(), &error_body));
        }

        Ok(RecordStream::new(response.bytes_stream().boxed()))
    }
}

fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

fn classify_reqwest_error(e: &reqwest::Error) -> StreamError {
    if e.is_timeout() {
        StreamError::transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        StreamError::transport(format!("connection failed: {e}"))
    } else {
        StreamError::transport(format!("request error: {e}"))
    }
}
