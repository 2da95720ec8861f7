//! Completion client - forwards prompts to the third-party LLM API.
//!
//! The trait is the seam tests use to substitute a fake collaborator; the
//! HTTP implementation speaks the OpenAI-style chat-completions protocol.

use crate::config::LlmConfig;
use async_trait::async_trait;
use serde_json::Value;
use subtrim_shared::ApiError;
use tracing::debug;

/// External completion collaborator: one prompt in, the model's raw text
/// reply out. No structural guarantee on the reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ApiError>;
}

pub struct HttpCompletionClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpCompletionClient {
    pub fn new(config: &LlmConfig) -> Self {
        // No explicit timeout on the completion call; the liveness probe is
        // the only bounded outbound request. Known hardening opportunity.
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, ApiError> {
        let key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ApiError::Misconfigured("completion API credential is not set".to_string()))?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.2,
        });

        debug!("Completion request to {} (model {})", self.endpoint, self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("completion request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "completion API returned {}",
                response.status()
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("completion response unreadable: {e}")))?;

        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .unwrap_or("")
            .to_string();

        Ok(text)
    }
}
