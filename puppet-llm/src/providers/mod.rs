pub mod mock;
pub mod openai;
pub mod fallback;

pub use fallback::FallbackResponder;
pub use mock::{Intent, MockResponder};
pub use openai::OpenAiResponder;

use crate::error::Result;
use async_trait::async_trait;

/// Produces the avatar's reply to a user message
#[async_trait]
pub trait ResponseProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get_response(&self, message: &str) -> Result<String>;
}
