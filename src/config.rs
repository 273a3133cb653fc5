use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

use crate::external::{CaptionConfig, ChatConfig, RetrievalConfig, SpeechConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_dir: String,
    pub audio_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chat: ChatConfig,
    pub caption: CaptionConfig,
    pub speech: SpeechConfig,
    pub retrieval: RetrievalConfig,
    pub output: OutputConfig,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let openai_key = env::var("OPENAI_API_KEY").ok();
        let hf_token = env::var("HUGGINGFACEHUB_API_TOKEN").ok();

        // Load chat config
        let chat = ChatConfig {
            model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            endpoint: env::var("CHAT_ENDPOINT")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: openai_key,
            temperature: env::var("CHAT_TEMPERATURE")
                .unwrap_or_else(|_| "1.0".to_string())
                .parse()
                .unwrap_or(1.0),
            max_tokens: env::var("CHAT_MAX_TOKENS")
                .unwrap_or_else(|_| "200".to_string())
                .parse()
                .unwrap_or(200),
        };

        // Load caption config
        let caption = CaptionConfig {
            model: env::var("CAPTION_MODEL")
                .unwrap_or_else(|_| "Salesforce/blip-image-captioning-large".to_string()),
            endpoint: env::var("CAPTION_ENDPOINT")
                .unwrap_or_else(|_| "https://api-inference.huggingface.co".to_string()),
            api_key: hf_token.clone(),
        };

        // Load speech config
        let speech = SpeechConfig {
            model: env::var("SPEECH_MODEL")
                .unwrap_or_else(|_| "espnet/kan-bayashi_ljspeech_vits".to_string()),
            endpoint: env::var("SPEECH_ENDPOINT")
                .unwrap_or_else(|_| "https://api-inference.huggingface.co".to_string()),
            api_key: hf_token,
        };

        // Load retrieval config
        let retrieval = RetrievalConfig {
            endpoint: env::var("RETRIEVAL_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            api_key: env::var("RETRIEVAL_API_KEY").ok(),
        };

        // Load output config
        let output = OutputConfig {
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "./output".to_string()),
            audio_file: env::var("AUDIO_FILE").unwrap_or_else(|_| "audio.flac".to_string()),
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            chat,
            caption,
            speech,
            retrieval,
            output,
            log_level,
        })
    }
}
