use async_trait::async_trait;

use super::ChatTurn;
use crate::error::CompletionError;

/// Instruction sent with every completion request.
pub const SYSTEM_INSTRUCTION: &str = "You are the MindWell assistant: a warm, patient and \
non-judgemental companion for emotional wellbeing. Offer support, simple relaxation \
techniques and gentle guidance on mental health topics, encourage self-care, and keep \
answers short and focused on wellness.";

/// Reply used when the service answers without any candidate text.
pub const FALLBACK_REPLY: &str = "I couldn't generate a meaningful response.";

/// Remote text-completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate the next model turn for `turns`.
    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String, CompletionError>;
}
