//! Chat-completion backends for the LLM endpoint
//!
//! Every call resolves to an [`AiReply`]; transport failures never surface as
//! errors so callers pick their fallback explicitly.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{LlmBackendKind, LlmConfig};
use crate::{DadWearError, Result};

pub mod ollama;
pub mod openai;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

/// Outcome of a chat request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiReply {
    /// Non-empty, trimmed model output
    Text(String),
    /// Endpoint unreachable, timed out or answered with an error status
    Unavailable,
    /// Endpoint answered but the payload was unusable
    Malformed(String),
}

impl AiReply {
    /// Wrap raw model output, rejecting blank text
    #[must_use]
    pub fn from_content(content: &str) -> Self {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            AiReply::Malformed("empty response".to_string())
        } else {
            AiReply::Text(trimmed.to_string())
        }
    }

    /// Variant name for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AiReply::Text(_) => "text",
            AiReply::Unavailable => "unavailable",
            AiReply::Malformed(_) => "malformed",
        }
    }
}

/// Text or data built for a request, and whether model output went into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated<T> {
    pub value: T,
    pub from_ai: bool,
}

impl<T> Generated<T> {
    #[must_use]
    pub fn ai(value: T) -> Self {
        Self {
            value,
            from_ai: true,
        }
    }

    #[must_use]
    pub fn fallback(value: T) -> Self {
        Self {
            value,
            from_ai: false,
        }
    }
}

/// Chat message in the role/content shape both dialects share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    #[must_use]
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// A chat endpoint the advisor can talk to
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Send a system + user message pair and return the generated text
    async fn chat(&self, system: &str, user: &str) -> AiReply;

    /// Hit the health endpoint once and report the HTTP status code
    async fn probe_health(&self, timeout: Duration) -> Result<u16>;
}

pub(crate) fn http_client(config: &LlmConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.health_timeout())
        .timeout(config.timeout())
        .user_agent(concat!("dadwear/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DadWearError::config(format!("Failed to create LLM HTTP client: {e}")))
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Backend selected by configuration
pub fn build_backend(config: &LlmConfig) -> Result<Arc<dyn ChatBackend>> {
    let backend: Arc<dyn ChatBackend> = match config.backend {
        LlmBackendKind::Ollama => Arc::new(OllamaBackend::new(config)?),
        LlmBackendKind::OpenAi => Arc::new(OpenAiBackend::new(config)?),
    };
    tracing::info!(
        backend = backend.name(),
        base_url = %config.base_url,
        model = %config.model,
        "LLM backend configured"
    );
    Ok(backend)
}
