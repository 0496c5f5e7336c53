use axum::http::StatusCode;
use super::SignupListResponse;
use crate::services::signups::{SignupError, SignupStats};
use crate::state::test_helpers::{self, call, json_request, read_json};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn invalid_status_is_400() {
    let state = test_helpers::test_app_state();
    let uri = format!("/api/admin/beta-signups/{}", Uuid::new_v4());
    let response = call(&state, json_request("PATCH", &uri, Some(json!({ "status": "banned" })))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "Invalid status");
}

#[tokio::test]
async fn missing_status_is_400() {
    let state = test_helpers::test_app_state();
    let uri = format!("/api/admin/beta-signups/{}", Uuid::new_v4());
    let response = call(&state, json_request("PATCH", &uri, Some(json!({})))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_since_is_400() {
    let state = test_helpers::test_app_state();
    let response = call(&state, json_request("GET", "/api/admin/activity?since=last-week", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("last-week"));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn update_unknown_signup_is_404() {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL required for live-db-tests");
    let pool = crate::db::init_pool(&url, 2).await.expect("db init");
    let state = crate::state::AppState::new(pool, None);

    let uri = format!("/api/admin/beta-signups/{}", Uuid::new_v4());
    let response = call(&state, json_request("PATCH", &uri, Some(json!({ "status": "invited" })))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let listed = read_json(call(&state, json_request("GET", "/api/admin/beta-signups", None)).await).await;
    assert!(listed["stats"]["total"].is_number());
}

#[test]
fn signup_listing_carries_stats() {
    let stats = SignupStats { total: 3, pending: 2, active: 1, ..SignupStats::default() };
    let body = serde_json::to_value(SignupListResponse::new(Vec::new(), Ok(stats))).unwrap();
    assert_eq!(body["stats"]["total"], 3);
    assert_eq!(body["stats"]["pending"], 2);
    assert!(body.get("error").is_none());
}

#[test]
fn failed_stats_still_return_signups() {
    let err = SignupError::NotFound(Uuid::new_v4());
    let body = serde_json::to_value(SignupListResponse::new(Vec::new(), Err(err))).unwrap();
    assert_eq!(body["signups"], json!([]));
    assert!(body["stats"].is_null());
    assert_eq!(body["error"], "Stats unavailable");
}
