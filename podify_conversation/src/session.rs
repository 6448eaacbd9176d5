//! Session transcripts for the recommendation engine.
//!
//! A session is the model-memory side of a conversation: the persona
//! instruction plus every completed user/assistant exchange, in order.

use chrono::{DateTime, Utc};

use podify_core::{ChatMessage, Role};

/// An append-only conversation transcript keyed by an opaque session key.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    key: String,
    system_prompt: String,
    messages: Vec<ChatMessage>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create an empty session seeded with a system instruction.
    #[must_use]
    pub fn new(key: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Completed exchanges, oldest first. The system instruction is not included.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Build the model context for a new turn: instruction, history, then `turn`.
    #[must_use]
    pub fn context_with(&self, turn: &ChatMessage) -> Vec<ChatMessage> {
        let mut context = Vec::with_capacity(self.messages.len() + 2);
        context.push(ChatMessage::system(self.system_prompt.clone()));
        context.extend(self.messages.iter().cloned());
        context.push(turn.clone());
        context
    }

    /// Append one completed exchange.
    ///
    /// Both halves land together; a turn whose model call failed never
    /// reaches this point, so the transcript holds no dangling user entries.
    pub fn record_exchange(&mut self, user: ChatMessage, reply: ChatMessage) {
        debug_assert_eq!(user.role, Role::User);
        debug_assert_eq!(reply.role, Role::Assistant);
        self.messages.push(user);
        self.messages.push(reply);
        self.updated_at = Utc::now();
    }

    #[must_use]
    pub const fn exchange_count(&self) -> usize {
        self.messages.len() / 2
    }

    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
