//! Generative model boundary: send prompt text, receive reply text.

mod gemini;
mod types;

pub use gemini::GeminiClient;
pub use types::ModelError;

use async_trait::async_trait;

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider id used in logs and error messages.
    fn id(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}
