//! User activity log: page events posted by the site, read by admins.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

pub const DEFAULT_ADMIN_LIMIT: i64 = 500;
pub const MAX_ADMIN_LIMIT: i64 = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    #[error("action_type is required")]
    MissingActionType,
    #[error("invalid since timestamp: {0}")]
    InvalidSince(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Body of `POST /api/activity`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityEvent {
    pub action_type: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub action_type: String,
    pub user_id: Option<String>,
    pub email: Option<String>,
    /// Always a JSON object.
    pub metadata: serde_json::Value,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
    pub action_type: String,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub metadata: serde_json::Value,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Query string of `GET /api/admin/activity`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub action_type: Option<String>,
    pub utm_source: Option<String>,
    pub email: Option<String>,
    pub since: Option<String>,
}

/// Validated admin filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityFilter {
    pub limit: i64,
    pub offset: i64,
    pub action_type: Option<String>,
    pub utm_source: Option<String>,
    pub email: Option<String>,
    pub since: Option<OffsetDateTime>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Validate an incoming event.
///
/// # Errors
///
/// Returns [`ActivityError::MissingActionType`] when `action_type` is blank.
pub fn prepare_activity(event: ActivityEvent) -> Result<NewActivity, ActivityError> {
    let action_type = non_empty(event.action_type).ok_or(ActivityError::MissingActionType)?;
    let metadata = match event.metadata {
        Some(value @ serde_json::Value::Object(_)) => value,
        _ => serde_json::Value::Object(serde_json::Map::new()),
    };
    Ok(NewActivity {
        action_type,
        user_id: non_empty(event.user_id),
        email: non_empty(event.email),
        metadata,
        utm_source: non_empty(event.utm_source),
        utm_medium: non_empty(event.utm_medium),
        utm_campaign: non_empty(event.utm_campaign),
    })
}

impl ActivityFilter {
    /// Clamp paging and parse `since`.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::InvalidSince`] if `since` is not RFC 3339.
    pub fn from_query(query: ActivityQuery) -> Result<Self, ActivityError> {
        let since = match non_empty(query.since) {
            Some(raw) => Some(OffsetDateTime::parse(&raw, &Rfc3339).map_err(|_| ActivityError::InvalidSince(raw))?),
            None => None,
        };
        Ok(Self {
            limit: query.limit.unwrap_or(DEFAULT_ADMIN_LIMIT).clamp(1, MAX_ADMIN_LIMIT),
            offset: query.offset.unwrap_or(0).max(0),
            action_type: non_empty(query.action_type),
            utm_source: non_empty(query.utm_source),
            email: non_empty(query.email),
            since,
        })
    }
}

/// Insert one activity event.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn insert_activity(pool: &PgPool, activity: &NewActivity) -> Result<Uuid, ActivityError> {
    let id = Uuid::new_v4();
    sqlx::query(
        r"INSERT INTO user_activity
              (id, action_type, user_id, email, metadata, utm_source, utm_medium, utm_campaign)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(id)
    .bind(&activity.action_type)
    .bind(&activity.user_id)
    .bind(&activity.email)
    .bind(&activity.metadata)
    .bind(&activity.utm_source)
    .bind(&activity.utm_medium)
    .bind(&activity.utm_campaign)
    .execute(pool)
    .await?;
    Ok(id)
}

/// Build the filtered admin listing query.
pub(crate) fn build_list_query(filter: &ActivityFilter) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT id, action_type, user_id, email, metadata, utm_source, utm_medium, utm_campaign, created_at
         FROM user_activity
         WHERE TRUE",
    );
    if let Some(action_type) = &filter.action_type {
        builder.push(" AND action_type = ").push_bind(action_type);
    }
    if let Some(utm_source) = &filter.utm_source {
        builder.push(" AND utm_source = ").push_bind(utm_source);
    }
    if let Some(email) = &filter.email {
        builder.push(" AND email ILIKE ").push_bind(format!("%{email}%"));
    }
    if let Some(since) = filter.since {
        builder.push(" AND created_at >= ").push_bind(since);
    }
    builder.push(" ORDER BY created_at DESC LIMIT ");
    builder.push_bind(filter.limit);
    builder.push(" OFFSET ");
    builder.push_bind(filter.offset);
    builder
}

/// List activity newest first, filtered for the admin view.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_activity(pool: &PgPool, filter: &ActivityFilter) -> Result<Vec<ActivityRow>, ActivityError> {
    let rows = build_list_query(filter)
        .build_query_as::<ActivityRow>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[cfg(test)]
#[path = "activity_test.rs"]
mod tests;
