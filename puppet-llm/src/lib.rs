pub mod config;
pub mod error;
pub mod providers;

pub use config::{ChatMessage, GenerationConfig, MessageRole, ProviderKind};
pub use error::{GenerationError, Result};
pub use providers::{FallbackResponder, Intent, MockResponder, OpenAiResponder, ResponseProvider};
