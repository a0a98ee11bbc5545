//! Chat assistant.
//!
//! A [`Conversation`] keeps the ordered turns sent to a
//! [`CompletionClient`] and enforces one outstanding reply at a time.

mod client;
mod gemini;
mod retry;

pub use client::{CompletionClient, FALLBACK_REPLY, SYSTEM_INSTRUCTION};
pub use gemini::GeminiClient;
pub use retry::{with_retry, RetryPolicy, RetryingClient};

use serde::{Deserialize, Serialize};

use crate::error::{CompletionError, ValidationError};

pub const WELCOME_MESSAGE: &str = "Hello! I'm your wellness assistant. I'm here to provide \
emotional support and guidance. How are you feeling today?";

/// Shown in place of a reply when the service could not be reached.
pub const APOLOGY: &str = "Sorry, I ran into an issue getting a response. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// What the front end shows after a send.
#[derive(Debug)]
pub struct ChatReply {
    pub text: String,
    /// Set when `text` is the apology rather than a model reply.
    pub error: Option<CompletionError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
    pending: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A conversation opened by the assistant's welcome turn.
    pub fn new() -> Self {
        Self {
            turns: vec![ChatTurn::model(WELCOME_MESSAGE)],
            pending: false,
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Append the user's message and mark a reply as pending.
    pub fn begin(&mut self, message: &str) -> Result<(), ValidationError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        if self.pending {
            return Err(ValidationError::ReplyPending);
        }
        self.turns.push(ChatTurn::user(message));
        self.pending = true;
        Ok(())
    }

    /// Settle the pending reply. Failed replies are not added to the
    /// history; the apology is returned for display only.
    pub fn finish(&mut self, reply: Result<String, CompletionError>) -> ChatReply {
        self.pending = false;
        match reply {
            Ok(text) => {
                self.turns.push(ChatTurn::model(text.clone()));
                ChatReply { text, error: None }
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat reply failed");
                ChatReply {
                    text: APOLOGY.to_string(),
                    error: Some(e),
                }
            }
        }
    }

    /// `begin`, call the client with the full history, then `finish`.
    pub async fn send(
        &mut self,
        client: &dyn CompletionClient,
        message: &str,
    ) -> Result<ChatReply, ValidationError> {
        self.begin(message)?;
        let reply = client.complete(SYSTEM_INSTRUCTION, &self.turns).await;
        Ok(self.finish(reply))
    }
}
