// HTTP client for the Ollama API
//
// The streaming endpoint returns newline-delimited JSON records. Network
// frames can split a record anywhere, so bytes are buffered and only
// complete lines are parsed; a trailing partial line waits for the next
// read. A malformed line is logged and skipped, never fatal.

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;

use super::types::{
    ChatMessage, ChatRequest, ChatResponse, StreamChunk, TagsResponse, VersionResponse,
};
use crate::tools::ToolDefinition;

const REQUEST_TIMEOUT_SECS: u64 = 300;

pub struct OllamaClient {
    client: Client,
    host: String,
}

/// Reassembles complete lines from arbitrarily fragmented byte chunks.
/// Bytes after the last terminator stay buffered for the next push.
#[derive(Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete line it finishes.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes[..line_bytes.len() - 1]);
            lines.push(line.trim_end_matches('\r').to_string());
        }
        lines
    }
}

impl OllamaClient {
    pub fn new(host: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            host: host.into(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Liveness probe. Succeeds iff the server answers with a `version`
    /// field.
    pub async fn connect(&self) -> Result<()> {
        let url = format!("{}/api/version", self.host);
        let response: VersionResponse = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Could not reach Ollama server at {}", self.host))?
            .json()
            .await
            .context("Unexpected response from /api/version")?;

        tracing::debug!("Connected to Ollama {}", response.version);
        Ok(())
    }

    /// List model names known to the server.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.host);
        let response: TagsResponse = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Could not reach Ollama server at {}", self.host))?
            .json()
            .await
            .context("Unexpected response from /api/tags")?;

        Ok(response.models.into_iter().map(|m| m.name).collect())
    }

    /// Non-streaming chat completion. This is the authoritative path for
    /// structured tool-call requests. Transport and parse failures degrade
    /// to an empty assistant message; they are logged, never propagated.
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> ChatMessage {
        let request = ChatRequest::new(model, messages, tools, false);
        let url = format!("{}/api/chat", self.host);

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Chat request failed: {}", e);
                return ChatMessage::assistant("");
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Chat request failed\n\nStatus: {}\nBody: {}", status, body);
            return ChatMessage::assistant("");
        }

        match response.json::<ChatResponse>().await {
            Ok(parsed) => parsed.into_chat_message(),
            Err(e) => {
                tracing::error!("Failed to parse chat response: {}", e);
                ChatMessage::assistant("")
            }
        }
    }

    /// Streaming chat completion. Emits each content fragment to
    /// `on_chunk` in arrival order, exactly once, and returns the
    /// accumulated text. Used for progressive display only; tool calls are
    /// always fetched through the non-streaming path.
    pub async fn chat_stream<F>(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        mut on_chunk: F,
    ) -> String
    where
        F: FnMut(&str),
    {
        let request = ChatRequest::new(model, messages, tools, true);
        let url = format!("{}/api/chat", self.host);
        let mut full_text = String::new();

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Streaming chat request failed: {}", e);
                return full_text;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                "Streaming chat request failed\n\nStatus: {}\nBody: {}",
                status,
                body
            );
            return full_text;
        }

        let mut stream = response.bytes_stream();
        let mut buffer = LineBuffer::new();

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Stream read error: {}", e);
                    break;
                }
            };

            for line in buffer.push(&bytes) {
                if line.is_empty() {
                    continue;
                }
                let record: StreamChunk = match serde_json::from_str(&line) {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Skipping malformed stream line: {}", e);
                        continue;
                    }
                };
                if let Some(content) = record.message.and_then(|m| m.content) {
                    if !content.is_empty() {
                        full_text.push_str(&content);
                        on_chunk(&content);
                    }
                }
            }
        }

        full_text
    }
}
