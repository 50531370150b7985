//! Configuration for speech playback

use serde::{Deserialize, Serialize};

/// Speech playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Voice settings
    pub voice: VoiceConfig,

    /// Speech rate multiplier (0.1-10.0, default 0.9, slightly slow for lip-sync)
    pub rate: f32,

    /// Pitch (0.0-2.0, default 1.0)
    pub pitch: f32,

    /// Volume (0.0-1.0, default 1.0)
    pub volume: f32,

    /// Maximum utterance length in bytes
    pub max_text_length: usize,
}

/// Voice configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Exact voice name to use, if available
    pub name: Option<String>,

    /// Language code (e.g., "en-US", "es-ES")
    pub language: String,

    /// Substring preferred in the voice name when several voices share the language
    pub vendor_hint: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: VoiceConfig::default(),
            rate: 0.9,
            pitch: 1.0,
            volume: 1.0,
            max_text_length: 100_000,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            name: None,
            language: "en-US".to_string(),
            vendor_hint: Some("Google".to_string()),
        }
    }
}

impl VoiceConfig {
    /// Validate voice configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.language.is_empty() {
            return Err("Language code cannot be empty".to_string());
        }

        if self.language.len() > 32 {
            return Err("Language code too long (max 32 chars)".to_string());
        }

        // Should look like "en-US" or "en"
        if !self.language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("Language code contains invalid characters (only alphanumeric and '-' allowed)".to_string());
        }

        if let Some(ref name) = self.name {
            if name.is_empty() {
                return Err("Voice name cannot be empty if provided".to_string());
            }
            if name.len() > 256 {
                return Err("Voice name too long (max 256 chars)".to_string());
            }
            if name.chars().any(|c| c == '\0' || c.is_control()) {
                return Err("Voice name contains invalid characters".to_string());
            }
        }

        Ok(())
    }

    /// Language prefix used for voice matching ("en" for "en-US")
    pub fn language_prefix(&self) -> &str {
        self.language.split('-').next().unwrap_or(&self.language)
    }
}

impl SpeechConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.rate.is_finite() || !(0.1..=10.0).contains(&self.rate) {
            return Err("Speech rate must be between 0.1 and 10.0".to_string());
        }

        if !self.pitch.is_finite() || !(0.0..=2.0).contains(&self.pitch) {
            return Err("Pitch must be between 0.0 and 2.0".to_string());
        }

        if !self.volume.is_finite() || !(0.0..=1.0).contains(&self.volume) {
            return Err("Volume must be between 0.0 and 1.0".to_string());
        }

        if self.max_text_length == 0 {
            return Err("Max text length must be greater than 0".to_string());
        }

        const MAX_TEXT_LENGTH: usize = 1_000_000;
        if self.max_text_length > MAX_TEXT_LENGTH {
            return Err(format!("Max text length too large (max {} bytes)", MAX_TEXT_LENGTH));
        }

        self.voice.validate()
    }
}
