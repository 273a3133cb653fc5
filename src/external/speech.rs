use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::external::error::ExternalError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl SpeechConfig {
    /// Get the inference URL for the configured speech model
    pub fn get_url(&self) -> Result<String, ExternalError> {
        let base = self.endpoint.trim_end_matches('/');

        Url::parse(base)
            .map_err(|e| ExternalError::ConfigError(format!("Invalid endpoint: {}", e)))?;

        Ok(format!("{}/models/{}", base, self.model))
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            model: "espnet/kan-bayashi_ljspeech_vits".to_string(),
            endpoint: "https://api-inference.huggingface.co".to_string(),
            api_key: None,
        }
    }
}

/// A remote text-to-speech capability. Returns the audio bytes as served by
/// the endpoint (a FLAC container for the default model).
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ExternalError>;
}

/// Speech synthesis client for a HuggingFace-inference-style endpoint
pub struct SpeechEngine {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl SpeechEngine {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechEngine {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ExternalError> {
        let url = self.config.get_url()?;

        tracing::debug!(model = %self.config.model, chars = text.len(), "requesting speech synthesis");

        let mut request = self.client.post(&url).json(&json!({ "inputs": text }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalError::ApiError(format!(
                "speech synthesis failed with {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ExternalError::ApiError(
                "speech synthesis returned no audio".to_string(),
            ));
        }

        Ok(bytes.to_vec())
    }
}
