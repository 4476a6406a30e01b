//! OpenAI-compatible chat completions endpoint

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{instrument, warn};

use super::{AiReply, ChatBackend, ChatMessage, endpoint, http_client};
use crate::Result;
use crate::config::LlmConfig;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiBackend {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn chat(&self, system: &str, user: &str) -> AiReply {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: 0.7,
        };

        let http_request = self
            .client
            .post(endpoint(&self.base_url, "chat/completions"))
            .json(&request);

        let response = match self.with_auth(http_request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Chat completion request failed: {}", e);
                return AiReply::Unavailable;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Chat completion answered with status {}: {}", status, body);
            return AiReply::Unavailable;
        }

        match response.json::<CompletionResponse>().await {
            Ok(parsed) => match parsed.choices.into_iter().next() {
                Some(choice) => AiReply::from_content(&choice.message.content.unwrap_or_default()),
                None => AiReply::Malformed("API returned no choices".to_string()),
            },
            Err(e) => AiReply::Malformed(format!("invalid completion payload: {e}")),
        }
    }

    async fn probe_health(&self, timeout: Duration) -> Result<u16> {
        let request = self
            .client
            .get(endpoint(&self.base_url, "models"))
            .timeout(timeout);
        let response = self.with_auth(request).send().await?;
        Ok(response.status().as_u16())
    }
}
