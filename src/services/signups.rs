//! Beta signup service: early-access waitlist.
//!
//! Emails are stored trimmed and lower-cased with a unique constraint; a
//! repeat signup is reported as `AlreadyExists` rather than an error.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_FOCUS: &str = "cars";

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("invalid email")]
    InvalidEmail,
    #[error("signup not found: {0}")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignupStatus {
    Pending,
    Invited,
    Active,
    Declined,
}

impl SignupStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Invited => "invited",
            Self::Active => "active",
            Self::Declined => "declined",
        }
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "invited" => Some(Self::Invited),
            "active" => Some(Self::Active),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

/// Body of `POST /api/beta-signup`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BetaSignupRequest {
    pub email: Option<String>,
    pub role: Option<String>,
    pub source: Option<String>,
    pub focus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignup {
    pub email: String,
    pub role: String,
    pub source: String,
    pub focus: String,
}

/// Request metadata recorded alongside a signup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupTracking {
    pub ip_address: String,
    pub user_agent: String,
    pub referrer: String,
    pub utm: ReferrerUtm,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferrerUtm {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BetaSignupRow {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub source: String,
    pub focus: String,
    pub status: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SignupLookup {
    pub email: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SignupStats {
    pub total: i64,
    pub pending: i64,
    pub invited: i64,
    pub active: i64,
    pub declined: i64,
    pub last_7_days: i64,
}

pub enum SignupOutcome {
    Created(BetaSignupRow),
    AlreadyExists,
}

// =============================================================================
// VALIDATION
// =============================================================================

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Validate a signup request.
///
/// # Errors
///
/// Returns [`SignupError::MissingFields`] when email, role or source is
/// absent, or [`SignupError::InvalidEmail`] for a malformed address.
pub fn prepare_signup(req: BetaSignupRequest) -> Result<NewSignup, SignupError> {
    let (Some(email), Some(role), Some(source)) = (required(req.email), required(req.role), required(req.source))
    else {
        return Err(SignupError::MissingFields);
    };
    let email = normalize_email(&email).ok_or(SignupError::InvalidEmail)?;
    Ok(NewSignup { email, role, source, focus: required(req.focus).unwrap_or_else(|| DEFAULT_FOCUS.to_owned()) })
}

/// Pull `utm_*` query parameters out of a referrer URL. Unparseable or
/// `unknown` referrers yield no UTM data.
#[must_use]
pub fn utm_from_referrer(referrer: &str) -> ReferrerUtm {
    let Ok(url) = reqwest::Url::parse(referrer) else {
        return ReferrerUtm::default();
    };
    let mut utm = ReferrerUtm::default();
    for (key, value) in url.query_pairs() {
        let slot = match &*key {
            "utm_source" => &mut utm.source,
            "utm_medium" => &mut utm.medium,
            "utm_campaign" => &mut utm.campaign,
            _ => continue,
        };
        if slot.is_none() && !value.is_empty() {
            *slot = Some(value.into_owned());
        }
    }
    utm
}

// =============================================================================
// PERSISTENCE
// =============================================================================

const SIGNUP_COLUMNS: &str = "id, email, role, source, focus, status, ip_address, user_agent, referrer, \
                              utm_source, utm_medium, utm_campaign, created_at, updated_at";

/// Insert a signup unless the email is already on the list.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn insert_signup(
    pool: &PgPool,
    signup: &NewSignup,
    tracking: &SignupTracking,
) -> Result<SignupOutcome, SignupError> {
    let sql = format!(
        "INSERT INTO beta_signups
             (id, email, role, source, focus, ip_address, user_agent, referrer, utm_source, utm_medium, utm_campaign)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         ON CONFLICT (email) DO NOTHING
         RETURNING {SIGNUP_COLUMNS}"
    );
    let row = sqlx::query_as::<_, BetaSignupRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(&signup.email)
        .bind(&signup.role)
        .bind(&signup.source)
        .bind(&signup.focus)
        .bind(&tracking.ip_address)
        .bind(&tracking.user_agent)
        .bind(&tracking.referrer)
        .bind(&tracking.utm.source)
        .bind(&tracking.utm.medium)
        .bind(&tracking.utm.campaign)
        .fetch_optional(pool)
        .await?;

    Ok(row.map_or(SignupOutcome::AlreadyExists, SignupOutcome::Created))
}

/// Look up a signup by email.
///
/// # Errors
///
/// Returns [`SignupError::InvalidEmail`] for a malformed address or a
/// database error if the query fails.
pub async fn find_signup(pool: &PgPool, email: &str) -> Result<Option<SignupLookup>, SignupError> {
    let email = normalize_email(email).ok_or(SignupError::InvalidEmail)?;
    let row = sqlx::query_as::<_, SignupLookup>("SELECT email, status, created_at FROM beta_signups WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// List every signup newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_signups(pool: &PgPool) -> Result<Vec<BetaSignupRow>, SignupError> {
    let sql = format!("SELECT {SIGNUP_COLUMNS} FROM beta_signups ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, BetaSignupRow>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Aggregate counts for the admin dashboard.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn signup_stats(pool: &PgPool) -> Result<SignupStats, SignupError> {
    let stats = sqlx::query_as::<_, SignupStats>(
        r"SELECT
              COUNT(*)                                                  AS total,
              COUNT(*) FILTER (WHERE status = 'pending')                AS pending,
              COUNT(*) FILTER (WHERE status = 'invited')                AS invited,
              COUNT(*) FILTER (WHERE status = 'active')                 AS active,
              COUNT(*) FILTER (WHERE status = 'declined')               AS declined,
              COUNT(*) FILTER (WHERE created_at > now() - interval '7 days') AS last_7_days
          FROM beta_signups",
    )
    .fetch_one(pool)
    .await?;
    Ok(stats)
}

/// Move a signup to a new status.
///
/// # Errors
///
/// Returns [`SignupError::NotFound`] if no row has this ID.
pub async fn update_signup_status(pool: &PgPool, id: Uuid, status: SignupStatus) -> Result<(), SignupError> {
    let result = sqlx::query("UPDATE beta_signups SET status = $1, updated_at = now() WHERE id = $2")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(SignupError::NotFound(id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "signups_test.rs"]
mod tests;
