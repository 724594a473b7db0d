// Visible conversation for a coaching session

use super::message::ChatMessage;

/// Append-only, chronologically ordered list of chat messages.
///
/// Nothing is ever trimmed or reordered; the insertion order is the
/// conversation's chronology.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Add a user message to the conversation
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.push(ChatMessage::user(content));
    }

    /// Add an assistant message to the conversation
    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.push(ChatMessage::assistant(content));
    }

    /// Replace the whole conversation with a single assistant message.
    ///
    /// Only used when there was nothing to replace in the first place.
    pub(crate) fn reset_to_assistant_message(&mut self, content: impl Into<String>) {
        self.messages = vec![ChatMessage::assistant(content)];
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The last `count` messages, oldest first
    pub fn recent(&self, count: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
