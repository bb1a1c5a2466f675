//! Message types for conversation history.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single text message in a chat completion conversation.
///
/// # Examples
///
/// ```
/// use postforge_core::{Message, Role};
///
/// let message = Message::user("Write about fee markets");
/// assert_eq!(message.role, Role::User);
/// assert!(message.content.contains("fee markets"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// System message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
