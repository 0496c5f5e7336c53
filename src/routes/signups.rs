//! Beta signup routes: join the waitlist and check membership.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::{REFERER, USER_AGENT};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, check_rate_limit};
use crate::rate_limit::client_key;
use crate::services::signups::{
    self, BetaSignupRequest, BetaSignupRow, SignupError, SignupLookup, SignupOutcome, SignupTracking,
};
use crate::state::AppState;

const UNKNOWN: &str = "unknown";

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub already_exists: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BetaSignupRow>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupLookupQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupLookupResponse {
    pub exists: bool,
    pub data: Option<SignupLookup>,
}

pub(crate) fn signup_error_to_api(err: SignupError) -> ApiError {
    match err {
        SignupError::MissingFields => ApiError::bad_request(err.to_string()),
        SignupError::InvalidEmail => ApiError::bad_request("Invalid email"),
        SignupError::NotFound(_) => ApiError::not_found("Signup not found"),
        SignupError::Database(e) => ApiError::internal("beta_signups", &e),
    }
}

fn header_or_unknown(headers: &HeaderMap, name: axum::http::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_owned()
}

/// Collect client IP, user agent, referrer and referrer UTM params.
pub(crate) fn tracking_from_headers(headers: &HeaderMap) -> SignupTracking {
    let referrer = header_or_unknown(headers, REFERER);
    SignupTracking {
        ip_address: client_key(headers),
        user_agent: header_or_unknown(headers, USER_AGENT),
        utm: signups::utm_from_referrer(&referrer),
        referrer,
    }
}

/// `POST /api/beta-signup`: join the early-access list.
pub async fn create_signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<BetaSignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    check_rate_limit(&state, &headers)?;

    let signup = signups::prepare_signup(body).map_err(signup_error_to_api)?;
    let tracking = tracking_from_headers(&headers);
    let outcome = signups::insert_signup(&state.pool, &signup, &tracking)
        .await
        .map_err(signup_error_to_api)?;

    let response = match outcome {
        SignupOutcome::Created(row) => {
            info!(signup_id = %row.id, role = %row.role, source = %row.source, "beta signup created");
            SignupResponse {
                success: true,
                already_exists: false,
                message: "Successfully signed up for early access!",
                data: Some(row),
            }
        }
        SignupOutcome::AlreadyExists => SignupResponse {
            success: true,
            already_exists: true,
            message: "You're already signed up! We'll notify you when early access is ready.",
            data: None,
        },
    };
    Ok(Json(response))
}

/// `GET /api/beta-signup?email=`: is this email on the list?
pub async fn check_signup(
    State(state): State<AppState>,
    Query(query): Query<SignupLookupQuery>,
) -> Result<Json<SignupLookupResponse>, ApiError> {
    let email = query
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Email parameter required"))?;
    let data = signups::find_signup(&state.pool, &email)
        .await
        .map_err(signup_error_to_api)?;
    Ok(Json(SignupLookupResponse { exists: data.is_some(), data }))
}

#[cfg(test)]
#[path = "signups_test.rs"]
mod tests;
