//! A single open chat widget: state, fields and transcript together.
//!
//! ERROR HANDLING
//! ==============
//! Extraction misses are not errors; `transition` answers them with a
//! clarifying prompt. A transition that fails outright is answered with a
//! generic apology and leaves state untouched so the user can retry.

use std::time::Instant;

use tracing::warn;

use super::state::{CollectedFields, ConversationState, MessageLog, Role};
use super::transition::{self, Action, ChatError, HAVING_TROUBLE, RATE_LIMITED};

/// Exchanges allowed once the flow has reached the sign-in gate.
pub const MAX_GATED_EXCHANGES: u32 = 3;

/// What the widget shows after one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub state: ConversationState,
    pub action: Option<Action>,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    state: ConversationState,
    fields: CollectedFields,
    log: MessageLog,
    /// Sends made while gated; drives the post-gate limit.
    gated_exchanges: u32,
    last_active: Instant,
}

impl Conversation {
    /// Open a fresh conversation with the greeting already in the log.
    #[must_use]
    pub fn new() -> Self {
        let mut log = MessageLog::new();
        log.push(Role::Assistant, transition::GREETING);
        Self {
            state: ConversationState::Start,
            fields: CollectedFields::default(),
            log,
            gated_exchanges: 0,
            last_active: Instant::now(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ConversationState {
        self.state
    }

    #[must_use]
    pub fn fields(&self) -> &CollectedFields {
        &self.fields
    }

    #[must_use]
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    #[must_use]
    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    /// Close and reopen: drop everything and start over.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Handle one user message and append both sides to the log.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::EmptyMessage`] for blank input; nothing is logged.
    pub fn send(&mut self, input: &str) -> Result<Reply, ChatError> {
        self.send_at(input, Instant::now())
    }

    pub(crate) fn send_at(&mut self, input: &str, now: Instant) -> Result<Reply, ChatError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.last_active = now;
        self.log.push(Role::User, text);

        let gated = self.state.is_gated();
        if gated && self.gated_exchanges >= MAX_GATED_EXCHANGES {
            return Ok(self.respond(RATE_LIMITED.to_owned(), None));
        }

        match transition::transition(self.state, &self.fields, text) {
            Ok(step) => {
                if gated {
                    self.gated_exchanges += 1;
                }
                self.state = step.next;
                self.fields = step.fields;
                Ok(self.respond(step.reply, step.action))
            }
            Err(e) => {
                warn!(error = %e, state = self.state.as_str(), "chat reply generation failed");
                Ok(self.respond(HAVING_TROUBLE.to_owned(), None))
            }
        }
    }

    fn respond(&mut self, text: String, action: Option<Action>) -> Reply {
        self.log.push(Role::Assistant, text.clone());
        Reply { text, state: self.state, action }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
