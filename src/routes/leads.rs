//! Lead capture routes.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{ApiError, check_rate_limit};
use crate::services::leads::{self, LeadError, LeadRow, LeadStatus, LeadSubmission};
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 500;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadResponse {
    pub success: bool,
    pub lead_id: Uuid,
    pub score: i32,
    pub status: LeadStatus,
    pub message: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListLeadsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListLeadsResponse {
    pub success: bool,
    pub leads: Vec<LeadRow>,
    pub count: usize,
}

pub(crate) fn lead_error_to_api(err: LeadError) -> ApiError {
    match err {
        LeadError::MissingEmail => ApiError::bad_request(err.to_string()),
        LeadError::Encode(e) => ApiError::internal("leads", &e),
        LeadError::Database(e) => ApiError::internal("leads", &e),
    }
}

/// `POST /api/leads`: score and store a marketing lead.
pub async fn create_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LeadSubmission>,
) -> Result<Json<CreateLeadResponse>, ApiError> {
    check_rate_limit(&state, &headers)?;

    let lead = leads::prepare_lead(body).map_err(lead_error_to_api)?;
    let lead_id = leads::insert_lead(&state.pool, &lead)
        .await
        .map_err(lead_error_to_api)?;

    info!(%lead_id, score = lead.score.score, status = lead.score.status.as_str(), source = %lead.source, "lead captured");
    Ok(Json(CreateLeadResponse {
        success: true,
        lead_id,
        score: lead.score.score,
        status: lead.score.status,
        message: "Lead captured successfully",
    }))
}

/// `GET /api/leads`: newest leads first.
pub async fn list_leads(
    State(state): State<AppState>,
    Query(query): Query<ListLeadsQuery>,
) -> Result<Json<ListLeadsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);
    let rows = leads::list_leads(&state.pool, limit, offset)
        .await
        .map_err(lead_error_to_api)?;
    Ok(Json(ListLeadsResponse { success: true, count: rows.len(), leads: rows }))
}

/// `DELETE /api/leads/clear`: remove every lead.
pub async fn clear_leads(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = leads::clear_leads(&state.pool)
        .await
        .map_err(lead_error_to_api)?;
    info!(removed, "leads cleared");
    Ok(Json(serde_json::json!({ "success": true, "message": "All leads cleared successfully" })))
}

#[cfg(test)]
#[path = "leads_test.rs"]
mod tests;
