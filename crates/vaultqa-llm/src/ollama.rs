use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ChatMessage, LlmError, TextGenerator};

/// Sampling options forwarded to the Ollama `/api/chat` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OllamaOptions {
    pub temperature: f32,
    pub num_ctx: u32,
}

impl Default for OllamaOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            num_ctx: 4096,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Non-streaming client for a local Ollama server.
pub struct OllamaClient {
    base_url: String,
    model: String,
    options: OllamaOptions,
    client: Client,
}

impl OllamaClient {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        options: OllamaOptions,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("build client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            options,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_body<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: self.options,
        }
    }
}

fn parse_chat_response(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("decode chat response: {e}")))?;
    Ok(parsed.message.content)
}

#[async_trait]
impl TextGenerator for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model_hint(&self) -> Option<&str> {
        Some(&self.model)
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        debug!(model = %self.model, messages = messages.len(), "ollama chat request");
        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&self.request_body(messages))
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| LlmError::Transport(format!("read body: {e}")))?;
        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_chat_response(&body)
    }
}
