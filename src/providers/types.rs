// Provider-agnostic completion request

use crate::chat::ChatMessage;

/// Request for one chat completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Full message list, system guidance first
    pub messages: Vec<ChatMessage>,

    /// Overrides the provider's configured token limit
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            max_tokens: None,
        }
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}
