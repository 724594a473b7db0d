// Completion providers
//
// The session only needs "messages in, reply text out". The trait keeps the
// hosted endpoint swappable and lets tests script replies.

use anyhow::Result;
use async_trait::async_trait;

pub mod azure;
pub mod types;

pub use azure::AzureOpenAIProvider;
pub use types::CompletionRequest;

/// Trait for chat completion backends
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send the messages and return the assistant's reply text.
    ///
    /// Called once per request; failures are not retried.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
