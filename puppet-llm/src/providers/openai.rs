use crate::config::{ChatMessage, GenerationConfig, MessageRole};
use crate::error::{GenerationError, Result};
use crate::providers::ResponseProvider;
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Chat-completions responder keeping a rolling conversation history
pub struct OpenAiResponder {
    api_key: String,
    client: Client,
    config: GenerationConfig,
    history: RwLock<Vec<ChatMessage>>,
}

impl OpenAiResponder {
    pub fn new(config: GenerationConfig, api_key: String) -> Result<Self> {
        config.validate().map_err(GenerationError::Config)?;
        if api_key.trim().is_empty() {
            return Err(GenerationError::MissingApiKey("OpenAI".to_string()));
        }

        Ok(Self {
            api_key,
            client: Client::new(),
            config,
            history: RwLock::new(Vec::new()),
        })
    }

    /// Read the API key from the configured environment variable
    pub fn from_env(config: GenerationConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| GenerationError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.read().clone()
    }

    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    /// Request body for the next turn: system prompt, history, then the new message
    pub fn request_body(&self, message: &str) -> Value {
        let mut messages = Vec::with_capacity(self.history.read().len() + 2);
        messages.push(ChatMessage::new(MessageRole::System, self.config.system_prompt.clone()));
        messages.extend(self.history.read().iter().cloned());
        messages.push(ChatMessage::new(MessageRole::User, message));

        json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        })
    }

    fn record_turn(&self, message: &str, reply: &str) {
        let mut history = self.history.write();
        history.push(ChatMessage::new(MessageRole::User, message));
        history.push(ChatMessage::new(MessageRole::Assistant, reply));

        let limit = self.config.history_limit;
        if history.len() > limit {
            let excess = history.len() - limit;
            history.drain(..excess);
        }
    }
}

/// Pull the first choice's message content out of a chat-completions response
pub fn extract_content(json: &Value) -> Result<String> {
    let choices = json.get("choices").and_then(|c| c.as_array()).ok_or_else(|| {
        GenerationError::InvalidResponse("Invalid response format: no choices array".to_string())
    })?;

    let first = choices
        .first()
        .ok_or_else(|| GenerationError::InvalidResponse("No choices in response".to_string()))?;

    first["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GenerationError::InvalidResponse("Empty message content".to_string()))
}

#[async_trait]
impl ResponseProvider for OpenAiResponder {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn get_response(&self, message: &str) -> Result<String> {
        let body = self.request_body(message);

        let key_prefix = self.api_key.get(..8).unwrap_or("***");
        tracing::debug!("Requesting chat completion with key {}...", key_prefix);

        let url = format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(60))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text: String = text.chars().take(500).collect();
            return Err(GenerationError::Provider(format!("OpenAI API error: HTTP {}: {}", status, text)));
        }

        let json: Value = response.json().await?;
        let reply = extract_content(&json)?;
        self.record_turn(message, &reply);
        Ok(reply)
    }
}
