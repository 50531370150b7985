//! Settings file loading
//!
//! One file carries the `[speech]`, `[generation]` and `[avatar]` sections.
//! A section that fails to parse or validate is replaced by its defaults.

use crate::config::AvatarConfig;
use crate::error::AvatarError;
use puppet_llm::GenerationConfig;
use puppet_spk::SpeechConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Maximum settings file size
const MAX_SETTINGS_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PuppetSettings {
    pub speech: SpeechConfig,
    pub generation: GenerationConfig,
    pub avatar: AvatarConfig,
}

impl PuppetSettings {
    /// Load settings from a `.toml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AvatarError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let settings = if is_json {
            Self::from_json_str(&text)?
        } else {
            Self::from_toml_str(&text)?
        };
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, AvatarError> {
        check_size(text)?;
        let table: toml::Table = toml::from_str(text)?;
        let value = serde_json::to_value(table)?;
        Ok(Self::from_value(&value))
    }

    pub fn from_json_str(text: &str) -> Result<Self, AvatarError> {
        check_size(text)?;
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    fn from_value(value: &Value) -> Self {
        Self {
            speech: section(value, "speech", SpeechConfig::validate),
            generation: section(value, "generation", GenerationConfig::validate),
            avatar: section(value, "avatar", AvatarConfig::validate),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, AvatarError> {
        toml::to_string_pretty(self).map_err(|e| AvatarError::Config(e.to_string()))
    }
}

fn check_size(text: &str) -> Result<(), AvatarError> {
    if text.len() > MAX_SETTINGS_SIZE {
        return Err(AvatarError::Config(format!(
            "Settings too large ({} bytes, max {} bytes)",
            text.len(),
            MAX_SETTINGS_SIZE
        )));
    }
    Ok(())
}

fn section<T>(root: &Value, name: &str, validate: fn(&T) -> Result<(), String>) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = root.get(name) else {
        return T::default();
    };

    match serde_json::from_value::<T>(raw.clone()) {
        Ok(config) => match validate(&config) {
            Ok(()) => config,
            Err(e) => {
                warn!("Invalid [{}] settings: {}, using defaults", name, e);
                T::default()
            }
        },
        Err(e) => {
            warn!("Failed to parse [{}] settings: {}, using defaults", name, e);
            T::default()
        }
    }
}
