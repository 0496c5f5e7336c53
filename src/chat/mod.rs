//! Scripted lead-qualification chat.
//!
//! DESIGN
//! ======
//! The widget walks a fixed, forward-only flow: year/make/model, then
//! mileage and title status, then ZIP, then the sign-in gate. A user who
//! declines to sign in is asked for an email or phone number instead.
//!
//! `transition` is a pure function over `(state, fields, input)`. The
//! `Conversation` wrapper owns the transcript and the post-gate exchange
//! cap; nothing here performs I/O.

pub mod conversation;
pub mod extract;
pub mod state;
pub mod transition;

pub use conversation::Conversation;
pub use extract::Contact;
pub use state::{CollectedFields, ConversationState, MessageLog};
pub use transition::{Action, ChatError};
