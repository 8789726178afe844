//! Streaming chat client for a locally hosted Ollama endpoint.
//!
//! Ollama's `/api/chat` replies with newline-delimited JSON, one object per
//! line:
//! ```text
//! {"model":"mistral","message":{"role":"assistant","content":"Hello "},"done":false}
//! {"model":"mistral","message":{"role":"assistant","content":"World"},"done":false}
//! {"model":"mistral","message":{"role":"assistant","content":""},"done":true}
//! ```

use std::pin::Pin;

use futures::Stream;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::{LlmError, Result};
use crate::ndjson::chunk_stream_from_ndjson;

/// A stream of reply text fragments, in arrival order.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "mistral".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Open a streaming chat completion for a single user message.
    ///
    /// Malformed lines in the response stream are logged and skipped; they
    /// never terminate the stream. Transport failures and embedded API errors
    /// surface as stream errors.
    pub async fn chat_stream(&self, prompt: &str) -> Result<ChatStream> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(LlmError::Api(format!("HTTP {}: {}", status, text)));
        }

        Ok(chunk_stream_from_ndjson(response, |line| {
            match parse_chat_line(line) {
                Ok(fragment) => Ok(fragment),
                Err(LlmError::Json(err)) => {
                    log::error!("skipping malformed stream chunk: {err}");
                    Ok(None)
                }
                Err(other) => Err(other),
            }
        }))
    }

    /// Collect an entire streamed reply into one string.
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        let mut stream = self.chat_stream(prompt).await?;
        let mut reply = String::new();
        while let Some(fragment) = stream.next().await {
            reply.push_str(&fragment?);
        }
        Ok(reply)
    }
}

/// Parse one NDJSON line of an Ollama chat stream.
///
/// Returns:
/// - `Ok(Some(fragment))` for content-bearing lines
/// - `Ok(None)` for blank lines and lines without content (such as the final
///   `done` object)
/// - `Err(_)` for malformed JSON or an embedded API error
pub fn parse_chat_line(line: &str) -> Result<Option<String>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(line)?;

    if let Some(error) = value.get("error") {
        let message = error.as_str().unwrap_or("unknown Ollama error");
        return Err(LlmError::Api(message.to_string()));
    }

    let content = value
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str());

    match content {
        Some(text) if !text.is_empty() => Ok(Some(text.to_string())),
        _ => Ok(None),
    }
}
