//! Text generation provider used for motivational insights.

pub mod client;
pub mod error;
mod types;

pub use client::{AnthropicClient, API_VERSION};
pub use error::GenerationError;

use async_trait::async_trait;

/// Given a prompt, returns generated text or fails.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
