/// LLM Client: the transport seam for every Anthropic Messages API call in ApplyIQ.
///
/// This module only knows how to send one `ModelAttempt` and report what the provider
/// said. Retry, backoff and model fallback live in `optimizer`, which drives any
/// `LlmTransport` implementation (the real HTTP client or a scripted one in tests).
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const HTTP_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// One request against one model. Built fresh per attempt, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAttempt {
    pub model_id: String,
    pub max_output_tokens: u32,
    pub prompt: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[cfg(test)]
impl ContentBlock {
    pub fn text(text: &str) -> Self {
        Self {
            block_type: "text".to_string(),
            text: Some(text.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: String,
}

/// Joins every text-typed block in order, newline-separated.
/// Returns `None` when the reply carried no text blocks at all.
pub fn text_from_blocks(blocks: &[ContentBlock]) -> Option<String> {
    let texts: Vec<&str> = blocks
        .iter()
        .filter(|b| b.block_type == "text")
        .filter_map(|b| b.text.as_deref())
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider replies and failure classes
// ────────────────────────────────────────────────────────────────────────────

/// What the provider answered for a single attempt that reached it.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply {
    Success { content: Vec<ContentBlock> },
    Failure(ProviderFailure),
}

/// A non-success HTTP status together with the provider's error envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub status: u16,
    pub error_type: Option<String>,
    pub message: String,
}

/// Failure classes that drive retry and fallback decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    RateLimited,
    Overloaded,
    Auth,
    Client,
    ModelUnavailable,
    /// The request never produced an HTTP response.
    Network,
}

impl FailureClass {
    /// Transient classes are retried with backoff under the same budget.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            FailureClass::RateLimited | FailureClass::Overloaded | FailureClass::Network
        )
    }

    /// User-facing error class name.
    pub fn label(self) -> &'static str {
        match self {
            FailureClass::RateLimited | FailureClass::Overloaded | FailureClass::Network => {
                "ProviderTransientError"
            }
            FailureClass::Auth | FailureClass::Client => "ProviderPermanentError",
            FailureClass::ModelUnavailable => "ModelUnavailableError",
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ProviderFailure {
    /// Classifies this failure for an attempt against `model_id`.
    ///
    /// A 404, or a 400 whose message names the requested model, means the model id
    /// itself was rejected.
    pub fn classify(&self, model_id: &str) -> FailureClass {
        let message = self.message.to_lowercase();
        let overloaded = self.error_type.as_deref() == Some("overloaded_error");
        let names_model = !model_id.is_empty() && message.contains(&model_id.to_lowercase());

        match self.status {
            429 => FailureClass::RateLimited,
            s if s >= 500 || overloaded => FailureClass::Overloaded,
            401 | 403 => FailureClass::Auth,
            404 if names_model || message.contains("model") => FailureClass::ModelUnavailable,
            400 if names_model => FailureClass::ModelUnavailable,
            _ => FailureClass::Client,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transport trait + Anthropic implementation
// ────────────────────────────────────────────────────────────────────────────

/// Sends a single attempt to an LLM provider. Implementations hold no per-request
/// state so one instance can be shared across concurrent requests.
#[async_trait]
pub trait LlmTransport: Send + Sync {
    async fn send(&self, attempt: &ModelAttempt) -> Result<ProviderReply, LlmError>;
}

/// Anthropic Messages API transport.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: ANTHROPIC_API_URL.to_string(),
        })
    }
}

#[async_trait]
impl LlmTransport for AnthropicClient {
    async fn send(&self, attempt: &ModelAttempt) -> Result<ProviderReply, LlmError> {
        let request_body = AnthropicRequest {
            model: &attempt.model_id,
            max_tokens: attempt.max_output_tokens,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &attempt.prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Ok(ProviderReply::Failure(parse_failure(status.as_u16(), &body)));
        }

        let parsed: AnthropicResponse = serde_json::from_str(&body)?;
        if let Some(usage) = &parsed.usage {
            debug!(
                model = %attempt.model_id,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "LLM call succeeded"
            );
        }

        Ok(ProviderReply::Success {
            content: parsed.content,
        })
    }
}

/// Reads the `{"error": {"type", "message"}}` envelope, falling back to the raw body.
fn parse_failure(status: u16, body: &str) -> ProviderFailure {
    match serde_json::from_str::<AnthropicError>(body) {
        Ok(envelope) => ProviderFailure {
            status,
            error_type: envelope.error.error_type,
            message: envelope.error.message,
        },
        Err(_) => ProviderFailure {
            status,
            error_type: None,
            message: body.trim().to_string(),
        },
    }
}
