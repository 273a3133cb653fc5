mod caption;
mod chat;
pub mod error;
mod retrieval;
mod speech;

pub use caption::{CaptionConfig, CaptionEngine, ImageCaptioner};
pub use chat::{ChatConfig, ChatEngine, TextGeneration};
pub use error::ExternalError;
pub use retrieval::{RetrievalConfig, RetrievalEngine, RetrievalStore, SourceRef};
pub use speech::{SpeechConfig, SpeechEngine, SpeechSynthesizer};
