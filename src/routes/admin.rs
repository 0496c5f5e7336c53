//! Admin dashboard routes: signup management and activity browsing.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use super::ApiError;
use super::activity::activity_error_to_api;
use super::signups::signup_error_to_api;
use crate::services::activity::{self, ActivityFilter, ActivityQuery, ActivityRow};
use crate::services::signups::{self, BetaSignupRow, SignupError, SignupStats, SignupStatus};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SignupListResponse {
    pub signups: Vec<BetaSignupRow>,
    /// `null` when the counts could not be computed.
    pub stats: Option<SignupStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl SignupListResponse {
    /// A failed stats query still returns the listing.
    pub(crate) fn new(signups: Vec<BetaSignupRow>, stats: Result<SignupStats, SignupError>) -> Self {
        match stats {
            Ok(stats) => Self { signups, stats: Some(stats), error: None },
            Err(e) => {
                error!(error = %e, "beta signup stats query failed");
                Self { signups, stats: None, error: Some("Stats unavailable") }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSignupBody {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActivityListResponse {
    pub activities: Vec<ActivityRow>,
    pub total: usize,
}

/// `GET /api/admin/beta-signups`: every signup plus dashboard counts.
pub async fn list_signups(State(state): State<AppState>) -> Result<Json<SignupListResponse>, ApiError> {
    let signups = signups::list_signups(&state.pool)
        .await
        .map_err(signup_error_to_api)?;
    let stats = signups::signup_stats(&state.pool).await;
    Ok(Json(SignupListResponse::new(signups, stats)))
}

/// `PATCH /api/admin/beta-signups/:id`: move a signup to a new status.
pub async fn update_signup(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSignupBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = body
        .status
        .as_deref()
        .and_then(SignupStatus::from_str)
        .ok_or_else(|| ApiError::bad_request("Invalid status"))?;
    signups::update_signup_status(&state.pool, id, status)
        .await
        .map_err(signup_error_to_api)?;
    info!(%id, status = status.as_str(), "beta signup status updated");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// `GET /api/admin/activity`: filtered activity log, newest first.
pub async fn list_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityListResponse>, ApiError> {
    let filter = ActivityFilter::from_query(query).map_err(activity_error_to_api)?;
    let activities = activity::list_activity(&state.pool, &filter)
        .await
        .map_err(activity_error_to_api)?;
    Ok(Json(ActivityListResponse { total: activities.len(), activities }))
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
