//! Chat widget routes: open, send, reopen and close a conversation.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::{ApiError, check_rate_limit};
use crate::chat::{Action, ChatError, CollectedFields, Contact, Conversation, ConversationState, MessageLog};
use crate::services::leads;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub state: ConversationState,
    pub fields: CollectedFields,
    pub messages: MessageLog,
}

impl SessionResponse {
    fn from_conversation(session_id: Uuid, conversation: &Conversation) -> Self {
        Self {
            session_id,
            state: conversation.state(),
            fields: conversation.fields().clone(),
            messages: conversation.log().clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub reply: String,
    pub state: ConversationState,
    pub fields: CollectedFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<&'static str>,
    pub magic_link_sent: bool,
}

fn session_not_found() -> ApiError {
    ApiError::not_found("Chat session not found")
}

pub(crate) fn chat_error_to_api(err: ChatError) -> ApiError {
    ApiError::bad_request(err.to_string())
}

/// `POST /api/chat/sessions`: open the widget.
pub async fn open_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    check_rate_limit(&state, &headers)?;

    let session_id = Uuid::new_v4();
    let conversation = Conversation::new();
    let response = SessionResponse::from_conversation(session_id, &conversation);
    state.conversations.write().await.insert(session_id, conversation);

    info!(%session_id, "chat session opened");
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /api/chat/sessions/:id`: current state and transcript.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let conversations = state.conversations.read().await;
    let conversation = conversations.get(&session_id).ok_or_else(session_not_found)?;
    Ok(Json(SessionResponse::from_conversation(session_id, conversation)))
}

/// `POST /api/chat/sessions/:id/messages`: one exchange.
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    check_rate_limit(&state, &headers)?;

    let (reply, fields) = {
        let mut conversations = state.conversations.write().await;
        let conversation = conversations.get_mut(&session_id).ok_or_else(session_not_found)?;
        let reply = conversation.send(&body.text).map_err(chat_error_to_api)?;
        (reply, conversation.fields().clone())
    };

    let mut redirect_to = None;
    let mut magic_link_sent = false;
    match reply.action {
        Some(Action::Redirect(route)) => redirect_to = Some(route),
        Some(Action::MagicLink(contact)) => {
            magic_link_sent = true;
            spawn_chat_lead(state.pool.clone(), session_id, contact, fields.clone());
        }
        None => {}
    }

    Ok(Json(MessageResponse { reply: reply.text, state: reply.state, fields, redirect_to, magic_link_sent }))
}

/// `POST /api/chat/sessions/:id/reopen`: start over in place.
pub async fn reopen_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut conversations = state.conversations.write().await;
    let conversation = conversations.get_mut(&session_id).ok_or_else(session_not_found)?;
    conversation.reset();
    Ok(Json(SessionResponse::from_conversation(session_id, conversation)))
}

/// `DELETE /api/chat/sessions/:id`: close the widget.
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .conversations
        .write()
        .await
        .remove(&session_id)
        .ok_or_else(session_not_found)?;
    info!(%session_id, "chat session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// Record the captured contact as a lead without holding up the reply.
fn spawn_chat_lead(pool: PgPool, session_id: Uuid, contact: Contact, fields: CollectedFields) {
    tokio::spawn(async move {
        let lead = leads::chat_lead(&contact, &fields);
        match leads::insert_lead(&pool, &lead).await {
            Ok(lead_id) => info!(%session_id, %lead_id, "chat lead captured"),
            Err(e) => warn!(error = %e, %session_id, "chat lead capture failed"),
        }
    });
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
