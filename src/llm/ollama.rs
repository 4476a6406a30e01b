//! Local model server speaking the Ollama chat API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use super::{AiReply, ChatBackend, ChatMessage, endpoint, http_client};
use crate::Result;
use crate::config::LlmConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

pub struct OllamaBackend {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn chat(&self, system: &str, user: &str) -> AiReply {
        let start = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            stream: false,
        };

        let response = match self
            .client
            .post(endpoint(&self.base_url, "api/chat"))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Ollama request failed: {}", e);
                return AiReply::Unavailable;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Ollama answered with status {}", status);
            return AiReply::Unavailable;
        }

        let reply = match response.json::<ChatResponse>().await {
            Ok(ChatResponse {
                message: Some(message),
            }) => AiReply::from_content(&message.content),
            Ok(ChatResponse { message: None }) => {
                AiReply::Malformed("response has no message".to_string())
            }
            Err(e) => AiReply::Malformed(format!("invalid chat payload: {e}")),
        };

        debug!(
            "Ollama chat finished in {:.3}s ({})",
            start.elapsed().as_secs_f64(),
            reply.kind()
        );
        reply
    }

    async fn probe_health(&self, timeout: Duration) -> Result<u16> {
        let response = self
            .client
            .get(endpoint(&self.base_url, "api/tags"))
            .timeout(timeout)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }
}
