//! Market search route.

use axum::extract::State;
use axum::response::Json;

use super::ApiError;
use crate::services::market::{self, MarketError, MarketSearchRequest, MarketSearchResponse};
use crate::state::AppState;

pub(crate) fn market_error_to_api(err: MarketError) -> ApiError {
    match err {
        MarketError::MissingSearchTerm => ApiError::bad_request(err.to_string()),
        other => ApiError::internal("market_search", &other),
    }
}

/// `POST /api/v1/market-search`: live listings or direct marketplace links.
pub async fn market_search(
    State(state): State<AppState>,
    Json(body): Json<MarketSearchRequest>,
) -> Result<Json<MarketSearchResponse>, ApiError> {
    let response = market::search(state.market.as_deref(), body)
        .await
        .map_err(market_error_to_api)?;
    Ok(Json(response))
}

#[cfg(test)]
#[path = "market_test.rs"]
mod tests;
