//! Configuration for the animation coordinator

use serde::{Deserialize, Serialize};

pub const DEFAULT_FALLBACK_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";
pub const DEFAULT_GREETING: &str = "Hello! I'm your interactive avatar. How can I help you today?";

/// Avatar animation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Drive the mouth from speech events
    pub enable_lip_sync: bool,

    /// Allow manual gestures
    pub enable_gestures: bool,

    /// Manual expression / gesture dwell before reverting to neutral / idle
    pub dwell_ms: u64,

    /// Mouth jitter tick while speaking
    pub jitter_interval_ms: u64,

    /// Mouth intensity written on each word boundary (0.0-1.0)
    pub word_emphasis: f32,

    /// Pause between showing a reply and speaking it
    pub reply_display_delay_ms: u64,

    /// Manual animation clip dwell before reverting to idle
    pub animation_revert_ms: u64,

    /// Message shown when a turn fails
    pub fallback_message: String,

    /// Avatar message placed in the transcript at startup
    pub greeting: Option<String>,

    /// Resting position of the avatar root
    pub base_position: [f32; 3],
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            enable_lip_sync: true,
            enable_gestures: true,
            dwell_ms: 5000,
            jitter_interval_ms: 80,
            word_emphasis: 0.4,
            reply_display_delay_ms: 300,
            animation_revert_ms: 3000,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            greeting: Some(DEFAULT_GREETING.to_string()),
            base_position: [0.0, -0.8, 0.0],
        }
    }
}

impl AvatarConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        const MAX_DWELL_MS: u64 = 600_000;

        if self.dwell_ms == 0 || self.dwell_ms > MAX_DWELL_MS {
            return Err(format!("Dwell must be between 1 and {} ms", MAX_DWELL_MS));
        }

        if self.animation_revert_ms == 0 || self.animation_revert_ms > MAX_DWELL_MS {
            return Err(format!("Animation revert must be between 1 and {} ms", MAX_DWELL_MS));
        }

        if !(10..=1000).contains(&self.jitter_interval_ms) {
            return Err("Jitter interval must be between 10 and 1000 ms".to_string());
        }

        if !self.word_emphasis.is_finite() || !(0.0..=1.0).contains(&self.word_emphasis) {
            return Err("Word emphasis must be between 0.0 and 1.0".to_string());
        }

        if self.reply_display_delay_ms > 10_000 {
            return Err("Reply display delay too large (max 10000 ms)".to_string());
        }

        if self.fallback_message.trim().is_empty() {
            return Err("Fallback message cannot be empty".to_string());
        }

        if self.base_position.iter().any(|v| !v.is_finite()) {
            return Err("Base position must be finite".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AvatarConfig::default();
        assert_eq!(config.dwell_ms, 5000);
        assert_eq!(config.jitter_interval_ms, 80);
        assert_eq!(config.word_emphasis, 0.4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = AvatarConfig::default();
        config.word_emphasis = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = AvatarConfig::default();
        config.jitter_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AvatarConfig::default();
        config.fallback_message = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
