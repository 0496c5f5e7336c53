use super::*;
use crate::chat::extract::Contact;
use crate::chat::transition::{ASK_CONTACT, ASK_CONTACT_AGAIN, DASHBOARD_ROUTE, GREETING, MAX_MESSAGE_CHARS, REDIRECTING};

fn gated() -> Conversation {
    let mut convo = Conversation::new();
    convo.send("2018 Honda Civic").unwrap();
    convo.send("45,000 miles, clean title").unwrap();
    convo.send("48104").unwrap();
    assert_eq!(convo.state(), ConversationState::GateToLogin);
    convo
}

#[test]
fn new_conversation_starts_with_greeting() {
    let convo = Conversation::new();
    assert_eq!(convo.state(), ConversationState::Start);
    assert_eq!(convo.log().len(), 1);
    let first = &convo.log().entries()[0];
    assert_eq!(first.role, Role::Assistant);
    assert_eq!(first.text, GREETING);
    assert_eq!(convo.fields(), &CollectedFields::default());
}

#[test]
fn example_scenario_end_to_end() {
    let mut convo = Conversation::new();

    let r = convo.send("2018 Honda Civic").unwrap();
    assert_eq!(r.state, ConversationState::CollectBasic);
    assert!(r.text.contains("miles") && r.text.contains("title"));

    let r = convo.send("45,000 miles, clean title").unwrap();
    assert_eq!(r.state, ConversationState::CollectMeta);
    assert!(r.text.contains("ZIP"));

    let r = convo.send("48104").unwrap();
    assert_eq!(r.state, ConversationState::GateToLogin);
    assert!(r.text.to_lowercase().contains("sign in"));

    let r = convo.send("not now").unwrap();
    assert_eq!(r.state, ConversationState::NudgeAltCapture);
    assert_eq!(r.text, ASK_CONTACT);

    let r = convo.send("test@example.com").unwrap();
    assert!(r.text.contains("magic link"));
    assert_eq!(r.action, Some(Action::MagicLink(Contact::Email("test@example.com".into()))));

    let fields = convo.fields();
    assert_eq!(fields.year.as_deref(), Some("2018"));
    assert_eq!(fields.mileage.as_deref(), Some("45,000"));
    assert_eq!(fields.title_status.as_deref(), Some("clean"));
    assert_eq!(fields.zip.as_deref(), Some("48104"));
    assert_eq!(fields.summary(), "2018 Honda Civic, 45,000 miles, clean title, ZIP 48104");
}

#[test]
fn log_mirrors_send_order() {
    let mut convo = Conversation::new();
    convo.send("  2018 Honda Civic  ").unwrap();
    convo.send("no idea").unwrap();
    let roles: Vec<Role> = convo.log().entries().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::Assistant, Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(convo.log().entries()[1].text, "2018 Honda Civic");
}

#[test]
fn empty_message_is_rejected_without_logging() {
    let mut convo = Conversation::new();
    assert_eq!(convo.send("   "), Err(ChatError::EmptyMessage));
    assert_eq!(convo.log().len(), 1);
    assert_eq!(convo.state(), ConversationState::Start);
}

#[test]
fn failed_reply_generation_apologizes_and_keeps_state() {
    let mut convo = Conversation::new();
    convo.send("2018 Honda Civic").unwrap();
    let before = convo.fields().clone();

    let r = convo.send(&"x".repeat(MAX_MESSAGE_CHARS + 5)).unwrap();
    assert_eq!(r.text, HAVING_TROUBLE);
    assert_eq!(r.state, ConversationState::CollectBasic);
    assert_eq!(convo.fields(), &before);

    let r = convo.send("45,000 miles, clean title").unwrap();
    assert_eq!(r.state, ConversationState::CollectMeta);
}

#[test]
fn failed_gated_replies_do_not_use_up_the_cap() {
    let mut convo = gated();
    for _ in 0..MAX_GATED_EXCHANGES {
        let r = convo.send(&"x".repeat(MAX_MESSAGE_CHARS + 1)).unwrap();
        assert_eq!(r.text, HAVING_TROUBLE);
        assert_eq!(r.state, ConversationState::GateToLogin);
    }

    let r = convo.send("not now").unwrap();
    assert_eq!(r.state, ConversationState::NudgeAltCapture);
    assert_eq!(r.text, ASK_CONTACT);
}

#[test]
fn redirect_action_on_sign_in() {
    let mut convo = gated();
    let r = convo.send("sign in").unwrap();
    assert_eq!(r.text, REDIRECTING);
    assert_eq!(r.state, ConversationState::GateToLogin);
    assert_eq!(r.action, Some(Action::Redirect(DASHBOARD_ROUTE)));
}

#[test]
fn gated_exchanges_are_capped() {
    let mut convo = gated();
    assert_eq!(convo.send("not now").unwrap().text, ASK_CONTACT);
    assert_eq!(convo.send("hmm").unwrap().text, ASK_CONTACT_AGAIN);
    assert_eq!(convo.send("still no").unwrap().text, ASK_CONTACT_AGAIN);

    let r = convo.send("test@example.com").unwrap();
    assert_eq!(r.text, RATE_LIMITED);
    assert!(r.action.is_none());
    assert!(convo.fields().contact.is_none());
    assert_eq!(convo.state(), ConversationState::NudgeAltCapture);
}

#[test]
fn pre_gate_messages_do_not_count_toward_cap() {
    let mut convo = Conversation::new();
    for _ in 0..10 {
        convo.send("no year here").unwrap();
    }
    convo.send("2018 Honda Civic").unwrap();
    convo.send("45,000 miles, clean title").unwrap();
    convo.send("48104").unwrap();
    convo.send("not now").unwrap();
    let r = convo.send("test@example.com").unwrap();
    assert!(r.text.contains("magic link"));
}

#[test]
fn reset_clears_everything() {
    let mut convo = gated();
    convo.send("not now").unwrap();
    convo.reset();
    assert_eq!(convo.state(), ConversationState::Start);
    assert_eq!(convo.fields(), &CollectedFields::default());
    assert_eq!(convo.log().len(), 1);
    assert_eq!(convo.log().last().map(|m| m.text.as_str()), Some(GREETING));

    // Cap counter is reset too.
    convo.send("2018 Honda Civic").unwrap();
    convo.send("45,000 miles, clean title").unwrap();
    convo.send("48104").unwrap();
    convo.send("not now").unwrap();
    assert!(convo.send("test@example.com").unwrap().text.contains("magic link"));
}

#[test]
fn send_updates_last_active() {
    let mut convo = Conversation::new();
    let later = convo.last_active() + std::time::Duration::from_secs(5);
    convo.send_at("hello", later).unwrap();
    assert_eq!(convo.last_active(), later);
}
