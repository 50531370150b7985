use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly and helpful AI avatar assistant. \
Keep responses conversational, warm, and concise (2-3 sentences max unless asked for more detail).";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: ProviderKind,
    pub model: String,
    /// Base URL of the chat-completions API
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Conversation turns kept for context (user and assistant messages)
    pub history_limit: usize,
    /// Simulated latency of the mock responder
    pub mock_delay_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: "gpt-3.5-turbo".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.7,
            max_tokens: 150,
            history_limit: 20,
            mock_delay_ms: 1000,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }

        if !self.endpoint.starts_with("https://") {
            return Err(format!("Endpoint must be an https URL: {}", self.endpoint));
        }

        if self.api_key_env.trim().is_empty() {
            return Err("API key environment variable cannot be empty".to_string());
        }

        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 2.0".to_string());
        }

        if self.max_tokens == 0 || self.max_tokens > 4096 {
            return Err("Max tokens must be between 1 and 4096".to_string());
        }

        if self.mock_delay_ms > 60_000 {
            return Err("Mock delay too large (max 60000 ms)".to_string());
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Canned replies only
    Mock,
    /// OpenAI chat completions, falling back to canned replies
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Mock => "mock",
            ProviderKind::OpenAi => "openai",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mock" => Some(ProviderKind::Mock),
            "openai" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_default() {
        let config = GenerationConfig::default();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 150);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!(ProviderKind::from_str("OpenAI"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::from_str("mock"), Some(ProviderKind::Mock));
        assert_eq!(ProviderKind::from_str("cohere"), None);
        assert_eq!(ProviderKind::Mock.as_str(), "mock");
    }

    #[test]
    fn test_message_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::new(MessageRole::Assistant, "hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_endpoint_requires_https() {
        let mut config = GenerationConfig::default();
        config.endpoint = "http://api.openai.com/v1".to_string();
        assert!(config.validate().is_err());

        config.endpoint = "file:///etc/passwd".to_string();
        assert!(config.validate().is_err());

        config.endpoint = "https://llm.internal.example/v1".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_temperature() {
        let mut config = GenerationConfig::default();
        config.temperature = 3.0;
        assert!(config.validate().is_err());
    }
}
