use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::external::error::ExternalError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl RetrievalConfig {
    pub fn get_url(&self, path: &str) -> Result<String, ExternalError> {
        let base = self.endpoint.trim_end_matches('/');

        Url::parse(base)
            .map_err(|e| ExternalError::ConfigError(format!("Invalid endpoint: {}", e)))?;

        Ok(format!("{}/{}", base, path))
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            api_key: None,
        }
    }
}

/// A source reference that the external retrieval service knows how to
/// ingest. Storage, embedding, and ranking all live on the other side of
/// the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceRef {
    WebPage(String),
    YoutubeVideo(String),
    PdfFile(String),
    QnaPair { question: String, answer: String },
}

impl SourceRef {
    pub fn data_type(&self) -> &'static str {
        match self {
            SourceRef::WebPage(_) => "web_page",
            SourceRef::YoutubeVideo(_) => "youtube_video",
            SourceRef::PdfFile(_) => "pdf_file",
            SourceRef::QnaPair { .. } => "qna_pair",
        }
    }
}

/// A remote retrieval-augmented QA capability
#[async_trait]
pub trait RetrievalStore: Send + Sync {
    async fn add(&self, source: &SourceRef) -> Result<(), ExternalError>;
    async fn query(&self, question: &str) -> Result<String, ExternalError>;
}

/// Client for an embedchain-style retrieval service exposing `/add` and
/// `/query`
pub struct RetrievalEngine {
    client: reqwest::Client,
    config: RetrievalConfig,
}

impl RetrievalEngine {
    pub fn new(config: RetrievalConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn add_body(source: &SourceRef) -> serde_json::Value {
        match source {
            SourceRef::WebPage(url)
            | SourceRef::YoutubeVideo(url)
            | SourceRef::PdfFile(url) => json!({
                "data_type": source.data_type(),
                "url": url
            }),
            SourceRef::QnaPair { question, answer } => json!({
                "data_type": source.data_type(),
                "question": question,
                "answer": answer
            }),
        }
    }
}

#[async_trait]
impl RetrievalStore for RetrievalEngine {
    async fn add(&self, source: &SourceRef) -> Result<(), ExternalError> {
        let url = self.config.get_url("add")?;

        tracing::info!(data_type = source.data_type(), "adding source to retrieval store");

        let mut request = self.client.post(&url).json(&Self::add_body(source));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalError::ApiError(format!(
                "add failed with {}: {}",
                status, body
            )));
        }

        Ok(())
    }

    async fn query(&self, question: &str) -> Result<String, ExternalError> {
        let url = self.config.get_url("query")?;

        let mut request = self.client.post(&url).json(&json!({ "query": question }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalError::ApiError(format!(
                "query failed with {}: {}",
                status, body
            )));
        }

        #[derive(Debug, Deserialize)]
        struct QueryResponse {
            answer: String,
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| ExternalError::ApiError(format!("malformed query response: {}", e)))?;

        Ok(parsed.answer)
    }
}
