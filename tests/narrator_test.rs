use std::path::Path;
use std::sync::Arc;

use assert_fs::prelude::*;
use async_trait::async_trait;
use mockall::mock;
use predicates::prelude::*;

use llm_pipeline_runner::{
    Artifact, ExternalError, ImageCaptioner, PipelineError, SpeechSynthesizer, StoryNarrator,
    TextGeneration,
};

mock! {
    pub Captioner {}

    #[async_trait]
    impl ImageCaptioner for Captioner {
        async fn caption(&self, image_path: &Path) -> Result<String, ExternalError>;
    }
}

mock! {
    pub Storyteller {}

    #[async_trait]
    impl TextGeneration for Storyteller {
        async fn generate(&self, prompt: &str) -> Result<String, ExternalError>;
    }
}

mock! {
    pub Synthesizer {}

    #[async_trait]
    impl SpeechSynthesizer for Synthesizer {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ExternalError>;
    }
}

#[tokio::test]
async fn test_narrate_writes_audio_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let audio_path = temp.path().join("audio.flac");

    let mut captioner = MockCaptioner::new();
    captioner
        .expect_caption()
        .times(1)
        .returning(|_| Ok("a dog chasing waves on a beach".to_string()));

    let mut storyteller = MockStoryteller::new();
    storyteller
        .expect_generate()
        .withf(|prompt: &str| prompt.contains("CONTEXT: a dog chasing waves on a beach"))
        .times(1)
        .returning(|_| Ok("The dog raced the tide until dusk and won every round.".to_string()));

    let mut synthesizer = MockSynthesizer::new();
    synthesizer
        .expect_synthesize()
        .withf(|text: &str| text.starts_with("The dog raced the tide"))
        .times(1)
        .returning(|_| Ok(b"fLaC-audio-bytes".to_vec()));

    let narrator = StoryNarrator::new(
        Arc::new(captioner),
        Arc::new(storyteller),
        Arc::new(synthesizer),
    )
    .unwrap();

    let result = narrator
        .narrate(Path::new("photo.jpeg"), &audio_path)
        .await
        .unwrap();

    assert_eq!(result.scenario, "a dog chasing waves on a beach");
    assert!(!result.story.is_empty());
    assert_eq!(result.audio.content_type(), "audio/flac");
    assert!(matches!(result.audio, Artifact::Audio { .. }));

    temp.child("audio.flac").assert(predicate::path::exists());
    assert_eq!(std::fs::read(&audio_path).unwrap(), b"fLaC-audio-bytes");
}

#[tokio::test]
async fn test_caption_failure_aborts_before_story_stage() {
    let temp = assert_fs::TempDir::new().unwrap();
    let audio_path = temp.path().join("audio.flac");

    let mut captioner = MockCaptioner::new();
    captioner.expect_caption().times(1).returning(|_| {
        Err(ExternalError::ApiError(
            "cannot read image \"photo.jpeg\": No such file or directory".to_string(),
        ))
    });

    // Later stages must never be invoked
    let mut storyteller = MockStoryteller::new();
    storyteller.expect_generate().times(0);
    let mut synthesizer = MockSynthesizer::new();
    synthesizer.expect_synthesize().times(0);

    let narrator = StoryNarrator::new(
        Arc::new(captioner),
        Arc::new(storyteller),
        Arc::new(synthesizer),
    )
    .unwrap();

    let err = narrator
        .narrate(Path::new("photo.jpeg"), &audio_path)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Capability(_)));
    temp.child("audio.flac")
        .assert(predicate::path::exists().not());
}

#[tokio::test]
async fn test_story_failure_aborts_before_speech_stage() {
    let temp = assert_fs::TempDir::new().unwrap();
    let audio_path = temp.path().join("audio.flac");

    let mut captioner = MockCaptioner::new();
    captioner
        .expect_caption()
        .times(1)
        .returning(|_| Ok("a quiet harbor at dawn".to_string()));

    let mut storyteller = MockStoryteller::new();
    storyteller
        .expect_generate()
        .times(1)
        .returning(|_| Err(ExternalError::ApiError("quota exhausted".to_string())));

    let mut synthesizer = MockSynthesizer::new();
    synthesizer.expect_synthesize().times(0);

    let narrator = StoryNarrator::new(
        Arc::new(captioner),
        Arc::new(storyteller),
        Arc::new(synthesizer),
    )
    .unwrap();

    let err = narrator
        .narrate(Path::new("photo.jpeg"), &audio_path)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Capability(_)));
    temp.child("audio.flac")
        .assert(predicate::path::exists().not());
}
