// Chat messages and the conversation they form

pub mod conversation;
pub mod message;

pub use conversation::Conversation;
pub use message::{ChatMessage, Role};
