//! Error types for puppet-face

use puppet_llm::GenerationError;
use puppet_spk::SpeechError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown {kind} id: {value}")]
    UnknownId { kind: &'static str, value: String },

    #[error("Invalid frame: {0}")]
    Frame(String),

    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
