//! Router assembly and shared HTTP error shape.
//!
//! SYSTEM CONTEXT
//! ==============
//! The marketing site and chat widget call these JSON endpoints directly.
//! Public write routes pass through the in-memory rate limiter first; admin
//! routes sit behind whatever gate the deployment puts in front of
//! `/api/admin`.

pub mod activity;
pub mod admin;
pub mod chat;
pub mod leads;
pub mod market;
pub mod signups;

use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::rate_limit::{RateLimitError, client_key};
use crate::state::AppState;

/// Build the full API router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat/sessions", post(chat::open_session))
        .route(
            "/api/chat/sessions/{id}",
            get(chat::get_session).delete(chat::close_session),
        )
        .route("/api/chat/sessions/{id}/messages", post(chat::send_message))
        .route("/api/chat/sessions/{id}/reopen", post(chat::reopen_session))
        .route("/api/leads", get(leads::list_leads).post(leads::create_lead))
        .route("/api/leads/clear", delete(leads::clear_leads))
        .route("/api/beta-signup", get(signups::check_signup).post(signups::create_signup))
        .route("/api/activity", post(activity::log_activity))
        .route("/api/admin/beta-signups", get(admin::list_signups))
        .route("/api/admin/beta-signups/{id}", patch(admin::update_signup))
        .route("/api/admin/activity", get(admin::list_activity))
        .route("/api/v1/market-search", post(market::market_search))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error response rendered as `{"error": "..."}` with the given status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Log the underlying failure and hide it behind a generic message.
    pub fn internal(context: &'static str, err: &dyn std::fmt::Display) -> Self {
        error!(error = %err, context, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<RateLimitError> for ApiError {
    fn from(err: RateLimitError) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, err.to_string())
    }
}

/// Apply the public write rate limit to the calling client.
pub(crate) fn check_rate_limit(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    state
        .rate_limiter
        .check_and_record(&client_key(headers))
        .map_err(ApiError::from)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
