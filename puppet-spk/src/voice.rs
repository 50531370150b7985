//! Voice catalogue and selection

use crate::config::VoiceConfig;
use serde::{Deserialize, Serialize};

/// A voice offered by a playback engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag, e.g. "en-US"
    pub language: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}

/// Pick the voice to use from an engine's catalogue.
///
/// Order of preference: the exact configured name, a voice in the configured
/// language whose name contains the vendor hint, any voice in the configured
/// language, then the first voice offered.
pub fn select_voice<'a>(voices: &'a [Voice], config: &VoiceConfig) -> Option<&'a Voice> {
    if let Some(ref name) = config.name {
        if let Some(voice) = voices.iter().find(|v| &v.name == name) {
            return Some(voice);
        }
    }

    let prefix = config.language_prefix();
    let in_language = |v: &&Voice| v.language.starts_with(prefix);

    config
        .vendor_hint
        .as_deref()
        .and_then(|hint| voices.iter().filter(in_language).find(|v| v.name.contains(hint)))
        .or_else(|| voices.iter().find(in_language))
        .or_else(|| voices.first())
}
