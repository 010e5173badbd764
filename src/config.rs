use crate::error::{DigestError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default transcription model.
const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Default text-generation model for summaries and topic extraction.
const DEFAULT_GENERATION_MODEL: &str = "gpt-4.1-mini";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub transcription_model: String,
    pub generation_model: String,
    pub top_n_topics: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            top_n_topics: 3,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.openai_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("SPEECHDIGEST_TRANSCRIPTION_MODEL") {
            config.transcription_model = model;
        }
        if let Ok(model) = std::env::var("SPEECHDIGEST_GENERATION_MODEL") {
            config.generation_model = model;
        }
        if let Ok(top_n) = std::env::var("SPEECHDIGEST_TOP_N") {
            if let Ok(n) = top_n.parse() {
                config.top_n_topics = n;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.is_none() {
            return Err(DigestError::Config(
                "OPENAI_API_KEY not set. Export it with: export OPENAI_API_KEY=sk-..."
                    .to_string(),
            ));
        }

        if self.top_n_topics == 0 {
            return Err(DigestError::Config(
                "Topic count must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("speechdigest").join("config.toml"))
    }
}
