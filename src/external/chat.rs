use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::external::error::ExternalError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatConfig {
    /// Get the chat completions URL for the configured endpoint
    pub fn get_url(&self) -> Result<String, ExternalError> {
        let base = self.endpoint.trim_end_matches('/');

        // Validate the endpoint
        Url::parse(base)
            .map_err(|e| ExternalError::ConfigError(format!("Invalid endpoint: {}", e)))?;

        Ok(format!("{}/chat/completions", base))
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            temperature: 1.0,
            max_tokens: 200,
        }
    }
}

/// A remote text-generation capability. The pipeline only ever sees this
/// trait, so tests substitute a mock and production code uses [`ChatEngine`].
#[async_trait]
pub trait TextGeneration: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ExternalError>;
}

/// Chat-completion client for an OpenAI-compatible endpoint
pub struct ChatEngine {
    client: reqwest::Client,
    config: ChatConfig,
}

impl ChatEngine {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl TextGeneration for ChatEngine {
    async fn generate(&self, prompt: &str) -> Result<String, ExternalError> {
        let url = self.config.get_url()?;

        tracing::debug!(model = %self.config.model, "sending chat completion request");

        let mut request = self.client.post(&url).json(&json!({
            "model": &self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens
        }));

        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalError::ApiError(format!(
                "chat completion failed with {}: {}",
                status, body
            )));
        }

        #[derive(Debug, Deserialize)]
        struct ChatMessage {
            content: String,
        }

        #[derive(Debug, Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        #[derive(Debug, Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExternalError::ApiError(format!("malformed chat response: {}", e)))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ExternalError::ApiError("chat response had no choices".to_string()))?;

        Ok(reply)
    }
}
