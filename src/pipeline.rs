use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::external::{ExternalError, TextGeneration};
use crate::template::PromptTemplate;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("missing variable: {0}")]
    MissingVariable(String),

    #[error("capability error: {0}")]
    Capability(#[from] ExternalError),
}

/// The final output of a pipeline stage: an opaque payload plus the content
/// type the caller should render it as.
#[derive(Debug, Clone)]
pub enum Artifact {
    Text(String),
    Audio { bytes: Vec<u8>, content_type: String },
}

impl Artifact {
    pub fn content_type(&self) -> &str {
        match self {
            Artifact::Text(_) => "text/plain",
            Artifact::Audio { content_type, .. } => content_type,
        }
    }
}

/// A prompt template bound to a text-generation capability, ready to accept
/// fill-in values. One `run` is one filled prompt and one awaited request;
/// there is no retry and no local recovery.
#[derive(Clone)]
pub struct Pipeline {
    template: PromptTemplate,
    capability: Arc<dyn TextGeneration>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The capability is an opaque remote handle with nothing to show
        f.debug_struct("Pipeline")
            .field("template", &self.template)
            .finish()
    }
}

impl Pipeline {
    pub fn bind<I, S>(
        template: &str,
        variables: I,
        capability: Arc<dyn TextGeneration>,
    ) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let template = PromptTemplate::new(template, variables)?;
        Ok(Self {
            template,
            capability,
        })
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// Fill the template and send it to the bound capability. A fill
    /// failure returns before any request is issued.
    pub async fn run(&self, values: &HashMap<String, String>) -> Result<String, PipelineError> {
        let prompt = self.template.fill(values)?;

        tracing::debug!(prompt_len = prompt.len(), "running pipeline");
        let response = self.capability.generate(&prompt).await?;
        tracing::debug!(response_len = response.len(), "pipeline completed");

        Ok(response)
    }

    /// Convenience for single-variable templates: run with one named value.
    pub async fn run_with(&self, name: &str, value: &str) -> Result<String, PipelineError> {
        let mut values = HashMap::new();
        values.insert(name.to_string(), value.to_string());
        self.run(&values).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Generator {}

        #[async_trait]
        impl TextGeneration for Generator {
            async fn generate(&self, prompt: &str) -> Result<String, ExternalError>;
        }
    }

    #[tokio::test]
    async fn test_bind_and_run() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .withf(|prompt: &str| prompt.ends_with("Once upon a time"))
            .times(1)
            .returning(|_| Ok("there was a kingdom of glass.".to_string()));

        let pipeline = Pipeline::bind(
            "You are a helpful assistant.\n{query}",
            ["query"],
            Arc::new(mock),
        )
        .unwrap();

        let story = pipeline.run_with("query", "Once upon a time").await.unwrap();
        assert!(!story.is_empty());
    }

    #[tokio::test]
    async fn test_missing_variable_issues_no_request() {
        let mut mock = MockGenerator::new();
        mock.expect_generate().times(0);

        let pipeline =
            Pipeline::bind("Answer this: {question}", ["question"], Arc::new(mock)).unwrap();

        let err = pipeline.run(&HashMap::new()).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingVariable(ref v) if v == "question"));
    }

    #[tokio::test]
    async fn test_capability_error_propagates() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_| Err(ExternalError::ApiError("quota exhausted".to_string())));

        let pipeline = Pipeline::bind("{query}", ["query"], Arc::new(mock)).unwrap();

        let err = pipeline.run_with("query", "hello").await.unwrap_err();
        assert!(matches!(err, PipelineError::Capability(_)));
    }

    #[test]
    fn test_bind_rejects_undeclared_placeholder() {
        let mock = MockGenerator::new();
        let err = Pipeline::bind("{question}", ["query"], Arc::new(mock)).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_pipeline_debug_elides_capability() {
        let mock = MockGenerator::new();
        let pipeline = Pipeline::bind("{query}", ["query"], Arc::new(mock)).unwrap();

        let formatted = format!("{:?}", pipeline);
        assert!(formatted.contains("Pipeline"));
        assert!(formatted.contains("query"));
        assert!(!formatted.contains("capability"));
    }

    #[test]
    fn test_artifact_content_types() {
        assert_eq!(Artifact::Text("hi".to_string()).content_type(), "text/plain");
        let audio = Artifact::Audio {
            bytes: vec![0x66, 0x4c, 0x61, 0x43],
            content_type: "audio/flac".to_string(),
        };
        assert_eq!(audio.content_type(), "audio/flac");
    }
}
