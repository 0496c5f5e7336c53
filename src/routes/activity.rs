//! Activity tracking route.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use tracing::debug;

use super::{ApiError, check_rate_limit};
use crate::services::activity::{self, ActivityError, ActivityEvent};
use crate::state::AppState;

pub(crate) fn activity_error_to_api(err: ActivityError) -> ApiError {
    match err {
        ActivityError::MissingActionType | ActivityError::InvalidSince(_) => ApiError::bad_request(err.to_string()),
        ActivityError::Database(e) => ApiError::internal("user_activity", &e),
    }
}

/// `POST /api/activity`: record one page event.
pub async fn log_activity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ActivityEvent>,
) -> Result<Json<serde_json::Value>, ApiError> {
    check_rate_limit(&state, &headers)?;

    let event = activity::prepare_activity(body).map_err(activity_error_to_api)?;
    let id = activity::insert_activity(&state.pool, &event)
        .await
        .map_err(activity_error_to_api)?;
    debug!(%id, action_type = %event.action_type, "activity logged");
    Ok(Json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
#[path = "activity_test.rs"]
mod tests;
