//! Chat assistant models

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::validation::validate_chat_message;

/// Longest message the chat input accepts
pub const MAX_CHAT_MESSAGE_CHARS: u64 = 500;

/// Who wrote a conversation message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// One entry of a chat transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationMessage {
    pub text: String,
    pub sender: Sender,
}

impl ConversationMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Assistant,
        }
    }
}

/// A message typed into the chat screen
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatMessageInput {
    #[validate(custom = "validate_chat_text")]
    pub text: String,
}

/// Same rule the device applies: trimmed, non-empty, bounded length
fn validate_chat_text(text: &str) -> Result<(), ValidationError> {
    validate_chat_message(text).map(|_| ()).map_err(|e| {
        let mut error = ValidationError::new("chat_message");
        error.message = Some(Cow::Owned(e.message));
        error
    })
}
