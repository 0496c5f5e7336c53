use super::*;
use serde_json::json;

fn event(action_type: Option<&str>, metadata: Option<serde_json::Value>) -> ActivityEvent {
    ActivityEvent {
        action_type: action_type.map(str::to_owned),
        metadata,
        ..ActivityEvent::default()
    }
}

// =============================================================================
// prepare_activity
// =============================================================================

#[test]
fn action_type_is_required() {
    assert!(matches!(prepare_activity(event(None, None)), Err(ActivityError::MissingActionType)));
    assert!(matches!(prepare_activity(event(Some("  "), None)), Err(ActivityError::MissingActionType)));
}

#[test]
fn missing_action_type_message() {
    assert_eq!(ActivityError::MissingActionType.to_string(), "action_type is required");
}

#[test]
fn object_metadata_is_kept() {
    let activity = prepare_activity(event(Some("page_view"), Some(json!({ "path": "/pricing" })))).unwrap();
    assert_eq!(activity.action_type, "page_view");
    assert_eq!(activity.metadata, json!({ "path": "/pricing" }));
}

#[test]
fn non_object_metadata_becomes_empty_object() {
    for metadata in [None, Some(json!("text")), Some(json!([1, 2])), Some(json!(null)), Some(json!(7))] {
        let activity = prepare_activity(event(Some("click"), metadata)).unwrap();
        assert_eq!(activity.metadata, json!({}));
    }
}

#[test]
fn blank_optional_fields_are_dropped() {
    let mut ev = event(Some("signup_view"), None);
    ev.email = Some(String::new());
    ev.utm_source = Some(" google ".into());
    let activity = prepare_activity(ev).unwrap();
    assert!(activity.email.is_none());
    assert_eq!(activity.utm_source.as_deref(), Some("google"));
}

// =============================================================================
// ActivityFilter
// =============================================================================

#[test]
fn filter_defaults() {
    let filter = ActivityFilter::from_query(ActivityQuery::default()).unwrap();
    assert_eq!(filter.limit, DEFAULT_ADMIN_LIMIT);
    assert_eq!(filter.offset, 0);
    assert!(filter.since.is_none());
}

#[test]
fn filter_clamps_limit_and_offset() {
    let query = ActivityQuery { limit: Some(10_000), offset: Some(-5), ..ActivityQuery::default() };
    let filter = ActivityFilter::from_query(query).unwrap();
    assert_eq!(filter.limit, MAX_ADMIN_LIMIT);
    assert_eq!(filter.offset, 0);

    let query = ActivityQuery { limit: Some(0), ..ActivityQuery::default() };
    assert_eq!(ActivityFilter::from_query(query).unwrap().limit, 1);
}

#[test]
fn filter_parses_since() {
    let query = ActivityQuery { since: Some("2025-01-15T10:00:00Z".into()), ..ActivityQuery::default() };
    let since = ActivityFilter::from_query(query).unwrap().since.unwrap();
    assert_eq!(since.year(), 2025);
    assert_eq!(since.day(), 15);
}

#[test]
fn filter_rejects_bad_since() {
    let query = ActivityQuery { since: Some("yesterday".into()), ..ActivityQuery::default() };
    assert!(matches!(ActivityFilter::from_query(query), Err(ActivityError::InvalidSince(raw)) if raw == "yesterday"));
}

#[test]
fn list_query_without_filters() {
    let filter = ActivityFilter::from_query(ActivityQuery::default()).unwrap();
    let builder = build_list_query(&filter);
    let sql = builder.sql();
    assert!(sql.contains("WHERE TRUE ORDER BY created_at DESC LIMIT $1 OFFSET $2"));
}

#[test]
fn list_query_binds_each_filter() {
    let query = ActivityQuery {
        action_type: Some("page_view".into()),
        utm_source: Some("google".into()),
        email: Some("example.com".into()),
        since: Some("2025-01-01T00:00:00Z".into()),
        ..ActivityQuery::default()
    };
    let filter = ActivityFilter::from_query(query).unwrap();
    let builder = build_list_query(&filter);
    let sql = builder.sql();
    assert!(sql.contains("action_type = $1"));
    assert!(sql.contains("utm_source = $2"));
    assert!(sql.contains("email ILIKE $3"));
    assert!(sql.contains("created_at >= $4"));
    assert!(sql.contains("LIMIT $5 OFFSET $6"));
}

// =============================================================================
// live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn insert_and_filter_by_email() {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL required for live-db-tests");
    let pool = crate::db::init_pool(&url, 2).await.expect("db init");

    let marker = Uuid::new_v4().to_string();
    let mut ev = event(Some("page_view"), Some(json!({ "path": "/" })));
    ev.email = Some(format!("{marker}@Example.com"));
    let id = insert_activity(&pool, &prepare_activity(ev).unwrap()).await.unwrap();

    let query = ActivityQuery { email: Some(marker.to_uppercase()), ..ActivityQuery::default() };
    let rows = list_activity(&pool, &ActivityFilter::from_query(query).unwrap()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].metadata, json!({ "path": "/" }));
}
