pub mod chain;
pub mod config;
pub mod external;
pub mod pipeline;
pub mod session;
pub mod template;

pub use chain::{NarratedStory, StoryNarrator, STORY_TEMPLATE};
pub use config::Config;
pub use external::{
    CaptionEngine, ChatEngine, ExternalError, ImageCaptioner, RetrievalEngine, RetrievalStore,
    SourceRef, SpeechEngine, SpeechSynthesizer, TextGeneration,
};
pub use pipeline::{Artifact, Pipeline, PipelineError};
pub use session::SessionStore;
pub use template::PromptTemplate;
