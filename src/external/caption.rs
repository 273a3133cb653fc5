use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::external::error::ExternalError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl CaptionConfig {
    /// Get the inference URL for the configured captioning model
    pub fn get_url(&self) -> Result<String, ExternalError> {
        let base = self.endpoint.trim_end_matches('/');

        Url::parse(base)
            .map_err(|e| ExternalError::ConfigError(format!("Invalid endpoint: {}", e)))?;

        Ok(format!("{}/models/{}", base, self.model))
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            model: "Salesforce/blip-image-captioning-large".to_string(),
            endpoint: "https://api-inference.huggingface.co".to_string(),
            api_key: None,
        }
    }
}

/// A remote image-to-text capability
#[async_trait]
pub trait ImageCaptioner: Send + Sync {
    async fn caption(&self, image_path: &Path) -> Result<String, ExternalError>;
}

/// Image captioning client for a HuggingFace-inference-style endpoint.
/// Sends the raw JPEG bytes and returns the first generated caption.
pub struct CaptionEngine {
    client: reqwest::Client,
    config: CaptionConfig,
}

impl CaptionEngine {
    pub fn new(config: CaptionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageCaptioner for CaptionEngine {
    async fn caption(&self, image_path: &Path) -> Result<String, ExternalError> {
        // An unreadable image fails the stage before any network call
        let bytes = tokio::fs::read(image_path).await.map_err(|e| {
            ExternalError::ApiError(format!("cannot read image {:?}: {}", image_path, e))
        })?;

        let url = self.config.get_url()?;

        tracing::debug!(model = %self.config.model, bytes = bytes.len(), "requesting caption");

        let mut request = self.client.post(&url).body(bytes);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalError::ApiError(format!(
                "captioning failed with {}: {}",
                status, body
            )));
        }

        #[derive(Debug, Deserialize)]
        struct CaptionResponse {
            generated_text: String,
        }

        let captions: Vec<CaptionResponse> = response
            .json()
            .await
            .map_err(|e| ExternalError::ApiError(format!("malformed caption response: {}", e)))?;

        captions
            .into_iter()
            .next()
            .map(|c| c.generated_text)
            .ok_or_else(|| ExternalError::ApiError("caption response was empty".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_generation() {
        let config = CaptionConfig::default();
        assert_eq!(
            config.get_url().unwrap(),
            "https://api-inference.huggingface.co/models/Salesforce/blip-image-captioning-large"
        );

        let config = CaptionConfig {
            endpoint: "not a url".to_string(),
            ..CaptionConfig::default()
        };
        assert!(config.get_url().is_err());
    }

    #[tokio::test]
    async fn test_missing_image_fails_without_network() {
        // Endpoint that would refuse connections if it were ever contacted
        let engine = CaptionEngine::new(CaptionConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            ..CaptionConfig::default()
        });

        let err = engine
            .caption(Path::new("/nonexistent/photo.jpeg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExternalError::ApiError(_)), "got {:?}", err);
    }
}
