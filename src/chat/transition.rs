//! Pure transition function for the qualification flow.
//!
//! `transition` never touches the transcript or any I/O. It takes the current
//! state and fields plus one user message and returns what the conversation
//! should become and what to say back.

use super::extract::{self, Contact};
use super::state::{CollectedFields, ConversationState};

/// Client-side route the widget navigates to when the user accepts the gate.
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Longest message the reply generator accepts.
pub const MAX_MESSAGE_CHARS: usize = 2000;

pub const GREETING: &str =
    "Hey! I'm your Accorria agent 👋 Tell me what you're selling: the year, make, and model (e.g. \"2018 Honda Civic\").";
pub const ASK_YEAR: &str =
    "I didn't catch the year. What's the year, make, and model? For example: \"2018 Honda Civic\".";
pub const ASK_MILES_AND_TITLE: &str = "How many miles are on it, and is the title clean, rebuilt, or salvage?";
pub const ASK_ZIP: &str = "Great. What ZIP code is the vehicle in? I'll use it to pull local market prices.";
pub const ASK_ZIP_AGAIN: &str = "I need a 5-digit ZIP code to check local prices. What's yours?";
pub const REDIRECTING: &str = "Great! Taking you to sign in now...";
pub const ASK_CONTACT: &str = "No problem! Drop your email or phone number and I'll send you a magic link to pick up right where you left off.";
pub const ASK_CONTACT_AGAIN: &str =
    "I couldn't find an email or phone number there. What's the best email or phone to send your magic link to?";
pub const LINK_ALREADY_SENT: &str =
    "Your magic link is on its way. Check your inbox or messages to continue.";
pub const RATE_LIMITED: &str = "You've reached the chat limit for now. Sign in to keep going with your listing.";
pub const HAVING_TROUBLE: &str = "Sorry, I'm having trouble right now. Try again in a moment!";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("message exceeds {max} characters")]
    MessageTooLong { max: usize },
}

/// Side effect requested by a step. The state machine only describes it;
/// callers decide how to carry it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Navigate the widget to a sign-in route.
    Redirect(&'static str),
    /// Send a magic link to the captured contact.
    MagicLink(Contact),
}

/// Result of applying one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: ConversationState,
    pub fields: CollectedFields,
    pub reply: String,
    pub action: Option<Action>,
}

impl Step {
    fn plain(state: ConversationState, fields: CollectedFields, reply: impl Into<String>) -> Self {
        Self { next: state, fields, reply: reply.into(), action: None }
    }
}

/// Apply one user message to `(state, fields)`.
///
/// # Errors
///
/// Returns [`ChatError::MessageTooLong`] when the input is longer than
/// [`MAX_MESSAGE_CHARS`]; state and fields are then left to the caller.
pub fn transition(state: ConversationState, fields: &CollectedFields, input: &str) -> Result<Step, ChatError> {
    if input.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ChatError::MessageTooLong { max: MAX_MESSAGE_CHARS });
    }

    let mut fields = fields.clone();
    let step = match state {
        ConversationState::Start => on_start(fields, input),
        ConversationState::CollectBasic => {
            if let Some(mileage) = extract::extract_mileage(input) {
                fields.mileage = Some(mileage);
            }
            if let Some(title) = extract::extract_title_status(input) {
                fields.title_status = Some(title);
            }
            on_collect_basic(fields)
        }
        ConversationState::CollectMeta => match extract::extract_zip(input) {
            Some(zip) => {
                let reply = format!(
                    "Perfect, I have everything I need for {zip}. Sign in to see your instant price estimate \
                     and finish your listing. Just say \"sign in\" to continue."
                );
                fields.zip = Some(zip);
                Step { next: ConversationState::GateToLogin, fields, reply, action: None }
            }
            None => Step::plain(state, fields, ASK_ZIP_AGAIN),
        },
        ConversationState::GateToLogin => {
            if extract::wants_sign_in(input) {
                Step {
                    next: ConversationState::GateToLogin,
                    fields,
                    reply: REDIRECTING.to_owned(),
                    action: Some(Action::Redirect(DASHBOARD_ROUTE)),
                }
            } else {
                Step::plain(ConversationState::NudgeAltCapture, fields, ASK_CONTACT)
            }
        }
        ConversationState::NudgeAltCapture => on_nudge(fields, input),
    };
    Ok(step)
}

fn on_start(mut fields: CollectedFields, input: &str) -> Step {
    let Some(year) = extract::extract_year(input) else {
        return Step::plain(ConversationState::Start, fields, ASK_YEAR);
    };
    let vehicle = extract::extract_vehicle(input);
    let reply = match &vehicle {
        Some(vehicle) => format!("Nice, a {year} {vehicle}! {ASK_MILES_AND_TITLE}"),
        None => format!("Nice, a {year}! {ASK_MILES_AND_TITLE}"),
    };
    fields.year = Some(year);
    fields.vehicle = vehicle;
    Step { next: ConversationState::CollectBasic, fields, reply, action: None }
}

fn on_collect_basic(fields: CollectedFields) -> Step {
    if fields.mileage.is_some() && fields.title_status.is_some() {
        return Step::plain(ConversationState::CollectMeta, fields, ASK_ZIP);
    }
    let reply = match (&fields.mileage, &fields.title_status) {
        (Some(mileage), _) => format!("Got it, {mileage} miles. Is the title clean, rebuilt, or salvage?"),
        (None, Some(title)) => format!(
            "Thanks, {} title noted. About how many miles are on it?",
            title.to_lowercase()
        ),
        (None, None) => ASK_MILES_AND_TITLE.to_owned(),
    };
    Step::plain(ConversationState::CollectBasic, fields, reply)
}

fn on_nudge(mut fields: CollectedFields, input: &str) -> Step {
    if fields.contact.is_some() {
        return Step::plain(ConversationState::NudgeAltCapture, fields, LINK_ALREADY_SENT);
    }
    let Some(contact) = extract::extract_contact(input) else {
        return Step::plain(ConversationState::NudgeAltCapture, fields, ASK_CONTACT_AGAIN);
    };
    let reply = format!(
        "Done! I sent a magic link to {}. Open it to see your price estimate and finish your listing.",
        contact.as_str()
    );
    fields.contact = Some(contact.clone());
    Step { next: ConversationState::NudgeAltCapture, fields, reply, action: Some(Action::MagicLink(contact)) }
}

#[cfg(test)]
#[path = "transition_test.rs"]
mod tests;
