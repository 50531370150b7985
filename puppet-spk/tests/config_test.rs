//! Tests for speech configuration

use puppet_spk::config::{SpeechConfig, VoiceConfig};

#[test]
fn test_speech_config_default() {
    let config = SpeechConfig::default();
    assert_eq!(config.rate, 0.9);
    assert_eq!(config.pitch, 1.0);
    assert_eq!(config.volume, 1.0);
    assert_eq!(config.voice.language, "en-US");
    assert!(config.validate().is_ok());
}

#[test]
fn test_speech_config_validation_rate() {
    let mut config = SpeechConfig::default();
    config.rate = 11.0;
    assert!(config.validate().is_err());

    config.rate = 0.05;
    assert!(config.validate().is_err());

    config.rate = 2.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_speech_config_validation_volume() {
    let mut config = SpeechConfig::default();
    config.volume = 1.5;
    assert!(config.validate().is_err());

    config.volume = -0.1;
    assert!(config.validate().is_err());

    config.volume = 0.5;
    assert!(config.validate().is_ok());
}

#[test]
fn test_voice_config_validation() {
    let mut voice = VoiceConfig::default();
    voice.language = String::new();
    assert!(voice.validate().is_err());

    voice.language = "en_US".to_string();
    assert!(voice.validate().is_err());

    voice.language = "en-GB".to_string();
    voice.name = Some(String::new());
    assert!(voice.validate().is_err());

    voice.name = Some("Daniel".to_string());
    assert!(voice.validate().is_ok());
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: SpeechConfig = serde_json::from_str(r#"{"rate": 1.2}"#).unwrap();
    assert_eq!(config.rate, 1.2);
    assert_eq!(config.volume, 1.0);
    assert_eq!(config.voice.vendor_hint.as_deref(), Some("Google"));
}
