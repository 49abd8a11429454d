//! Agriculture assistant chat screen

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use shared::{normalize_chat_reply, validate_chat_message, ConversationMessage, ScreenState};
use uuid::Uuid;

use super::orchestrator::{ScreenContext, ScreenOrchestrator};
use super::registry::ScreenSession;
use crate::error::{AppError, AppResult};
use crate::external::gemini::CHAT_FAILURE_MESSAGE;
use crate::external::ChatApi;

/// First assistant message of every chat
pub const GREETING: &str = "Hello! I'm your Agriculture Assistant. What's your name?";

/// Reply to the first user message, which is taken as the user's name
pub fn welcome_message(name: &str) -> String {
    format!(
        "Nice to meet you, {}! I'm here to help you with agriculture, farming, and agricultural schemes. What would you like to know?",
        name
    )
}

/// Instructional prompt wrapped around every question
pub fn build_prompt(name: &str, question: &str) -> String {
    format!(
        "You are an agriculture assistant. The user's name is {name}.\n\
         Only provide information about agriculture, farming, and agricultural schemes.\n\
         Keep your responses concise and limited to 50 words maximum.\n\
         If the user asks about anything else, respond with \"I'm sorry, I can only help with agriculture-related topics. Please ask me about farming, crops, agricultural schemes, or other agriculture-related matters.\"\n\
         \n\
         User's question: {question}"
    )
}

#[derive(Debug, Default)]
struct ChatState {
    messages: Vec<ConversationMessage>,
    user_name: Option<String>,
    error: Option<String>,
}

/// What the chat screen renders
#[derive(Debug, Clone, Serialize)]
pub struct ChatSnapshot {
    pub id: Uuid,
    pub state: ScreenState,
    pub user_name: Option<String>,
    pub messages: Vec<ConversationMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct ChatSession {
    id: Uuid,
    orchestrator: ScreenOrchestrator,
    api: Arc<dyn ChatApi>,
    reply_word_limit: usize,
    inner: Mutex<ChatState>,
}

impl ChatSession {
    pub fn new(context: &ScreenContext, api: Arc<dyn ChatApi>) -> Self {
        Self {
            id: Uuid::new_v4(),
            orchestrator: ScreenOrchestrator::new(context),
            api,
            reply_word_limit: context.reply_word_limit,
            inner: Mutex::new(ChatState {
                messages: vec![ConversationMessage::assistant(GREETING)],
                ..ChatState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> ScreenState {
        self.orchestrator.state()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        let inner = self.lock();
        ChatSnapshot {
            id: self.id,
            state: self.orchestrator.state(),
            user_name: inner.user_name.clone(),
            messages: inner.messages.clone(),
            error: inner.error.clone(),
        }
    }

    /// Handle one message typed by the user.
    ///
    /// The first message only records the user's name. A remote failure is
    /// reported inside the transcript, so it still returns `Ok`.
    pub async fn send(&self, text: &str) -> AppResult<ChatSnapshot> {
        let validation = self.orchestrator.begin_validation()?;
        let text = match validate_chat_message(text) {
            Ok(text) => text.to_string(),
            Err(e) => {
                tracing::warn!(session = %self.id, "Rejected chat message: {}", e);
                validation.reject();
                return Err(e.into());
            }
        };
        let submission = validation.accept();

        let prompt = {
            let mut inner = self.lock();
            inner.error = None;
            inner.messages.push(ConversationMessage::user(text.clone()));
            match inner.user_name.clone() {
                Some(name) => Some(build_prompt(&name, &text)),
                None => {
                    inner.messages.push(ConversationMessage::assistant(welcome_message(&text)));
                    inner.user_name = Some(text.clone());
                    None
                }
            }
        };

        let Some(prompt) = prompt else {
            submission.run(async { Ok::<_, AppError>(()) }).await?;
            return Ok(self.snapshot());
        };

        tracing::info!(session = %self.id, "Sending chat prompt");
        let outcome = submission
            .run(async {
                let body = self.api.generate(&prompt).await?;
                Ok::<_, AppError>(normalize_chat_reply(&body, self.reply_word_limit))
            })
            .await;

        match outcome {
            Ok(reply) => {
                self.lock().messages.push(ConversationMessage::assistant(reply));
            }
            Err(AppError::Cancelled) => return Err(AppError::Cancelled),
            Err(e) => {
                tracing::error!(session = %self.id, "Chat request failed: {:?}", e);
                let mut inner = self.lock();
                inner
                    .messages
                    .push(ConversationMessage::assistant(CHAT_FAILURE_MESSAGE));
                inner.error = Some(e.user_message());
            }
        }
        Ok(self.snapshot())
    }
}

impl ScreenSession for ChatSession {
    fn id(&self) -> Uuid {
        self.id
    }

    fn close(&self) {
        self.orchestrator.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_name_and_question() {
        let prompt = build_prompt("Asha", "When should I sow wheat?");
        assert!(prompt.starts_with("You are an agriculture assistant. The user's name is Asha."));
        assert!(prompt.contains("limited to 50 words maximum"));
        assert!(prompt.ends_with("User's question: When should I sow wheat?"));
    }

    #[test]
    fn test_welcome_message() {
        assert_eq!(
            welcome_message("Ravi"),
            "Nice to meet you, Ravi! I'm here to help you with agriculture, farming, and agricultural schemes. What would you like to know?"
        );
    }
}
