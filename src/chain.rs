use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::external::{ImageCaptioner, SpeechSynthesizer, TextGeneration};
use crate::pipeline::{Artifact, Pipeline, PipelineError};

/// Storyteller template fed with the caption of an uploaded image
pub const STORY_TEMPLATE: &str = "You are a story teller;\n\
you can generate story based on simple narrative, the story should be no more than 50 words;\n\n\
CONTEXT: {scenario}\nSTORY:";

#[derive(Debug)]
pub struct NarratedStory {
    pub scenario: String,
    pub story: String,
    pub audio: Artifact,
    pub audio_path: PathBuf,
}

/// Caption an image, turn the caption into a short story, and speak the
/// story. Three external capabilities chained by plain strings: the output
/// of each stage is opaque to the next, and the first failure aborts the
/// chain before the following stage is invoked.
pub struct StoryNarrator {
    captioner: Arc<dyn ImageCaptioner>,
    story: Pipeline,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl StoryNarrator {
    pub fn new(
        captioner: Arc<dyn ImageCaptioner>,
        storyteller: Arc<dyn TextGeneration>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Result<Self, PipelineError> {
        let story = Pipeline::bind(STORY_TEMPLATE, ["scenario"], storyteller)?;
        Ok(Self {
            captioner,
            story,
            synthesizer,
        })
    }

    pub async fn narrate(
        &self,
        image_path: &Path,
        audio_path: &Path,
    ) -> Result<NarratedStory, PipelineError> {
        let scenario = self.captioner.caption(image_path).await?;
        tracing::info!(scenario = %scenario, "image captioned");

        let story = self.story.run_with("scenario", &scenario).await?;
        tracing::info!(words = story.split_whitespace().count(), "story generated");

        let bytes = self.synthesizer.synthesize(&story).await?;
        tokio::fs::write(audio_path, &bytes)
            .await
            .map_err(|e| PipelineError::Capability(anyhow::Error::new(e).into()))?;
        tracing::info!(path = %audio_path.display(), bytes = bytes.len(), "audio written");

        Ok(NarratedStory {
            scenario,
            story,
            audio: Artifact::Audio {
                bytes,
                content_type: "audio/flac".to_string(),
            },
            audio_path: audio_path.to_path_buf(),
        })
    }
}
