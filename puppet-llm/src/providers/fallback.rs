use crate::config::{GenerationConfig, ProviderKind};
use crate::error::{GenerationError, Result};
use crate::providers::{MockResponder, OpenAiResponder, ResponseProvider};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Tries the primary provider and answers from the mock when it is missing or fails
pub struct FallbackResponder {
    primary: Option<Arc<dyn ResponseProvider>>,
    mock: MockResponder,
}

impl FallbackResponder {
    pub fn new(primary: Option<Arc<dyn ResponseProvider>>, mock: MockResponder) -> Self {
        Self { primary, mock }
    }

    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        config.validate().map_err(GenerationError::Config)?;
        let mock = MockResponder::new(Duration::from_millis(config.mock_delay_ms))?;

        let primary: Option<Arc<dyn ResponseProvider>> = match config.provider {
            ProviderKind::Mock => None,
            ProviderKind::OpenAi => match OpenAiResponder::from_env(config.clone()) {
                Ok(responder) => Some(Arc::new(responder)),
                Err(e) => {
                    warn!("OpenAI responder unavailable ({}), using mock replies", e);
                    None
                }
            },
        };

        if let Some(ref primary) = primary {
            info!("Reply provider: {} with mock fallback", primary.name());
        }

        Ok(Self::new(primary, mock))
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }
}

#[async_trait]
impl ResponseProvider for FallbackResponder {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn get_response(&self, message: &str) -> Result<String> {
        if let Some(ref primary) = self.primary {
            match primary.get_response(message).await {
                Ok(reply) => return Ok(reply),
                Err(e) => warn!("{} provider failed: {}, falling back to mock", primary.name(), e),
            }
        }

        self.mock.get_response(message).await
    }
}
