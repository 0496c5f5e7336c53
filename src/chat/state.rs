//! Conversation record types: state, collected fields, message log.

use serde::{Deserialize, Serialize};

use super::extract::Contact;

// =============================================================================
// CONVERSATION STATE
// =============================================================================

/// Position in the scripted qualification flow. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Waiting for year/make/model.
    #[default]
    Start,
    /// Waiting for mileage and title status.
    CollectBasic,
    /// Waiting for ZIP code.
    CollectMeta,
    /// Asked the user to sign in.
    GateToLogin,
    /// User declined to sign in; asking for email or phone instead.
    NudgeAltCapture,
}

impl ConversationState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::CollectBasic => "collect_basic",
            Self::CollectMeta => "collect_meta",
            Self::GateToLogin => "gate_to_login",
            Self::NudgeAltCapture => "nudge_alt_capture",
        }
    }

    /// True once the flow has reached the sign-in gate.
    #[must_use]
    pub fn is_gated(self) -> bool {
        matches!(self, Self::GateToLogin | Self::NudgeAltCapture)
    }
}

// =============================================================================
// COLLECTED FIELDS
// =============================================================================

/// Everything extracted from the user so far, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedFields {
    pub year: Option<String>,
    /// Make/model words that followed the year.
    pub vehicle: Option<String>,
    pub mileage: Option<String>,
    pub title_status: Option<String>,
    pub zip: Option<String>,
    pub contact: Option<Contact>,
}

impl CollectedFields {
    /// One-line description used for lead notes, e.g.
    /// `"2018 Honda Civic, 45,000 miles, clean title, ZIP 48104"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        match (&self.year, &self.vehicle) {
            (Some(year), Some(vehicle)) => parts.push(format!("{year} {vehicle}")),
            (Some(year), None) => parts.push(year.clone()),
            (None, Some(vehicle)) => parts.push(vehicle.clone()),
            (None, None) => {}
        }
        if let Some(mileage) = &self.mileage {
            parts.push(format!("{mileage} miles"));
        }
        if let Some(title) = &self.title_status {
            parts.push(format!("{} title", title.to_lowercase()));
        }
        if let Some(zip) = &self.zip {
            parts.push(format!("ZIP {zip}"));
        }
        parts.join(", ")
    }
}

// =============================================================================
// MESSAGE LOG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

/// Append-only transcript in display order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct MessageLog {
    entries: Vec<ChatMessage>,
}

impl MessageLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        self.entries.push(ChatMessage { role, text: text.into() });
    }

    #[must_use]
    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.last()
    }
}
