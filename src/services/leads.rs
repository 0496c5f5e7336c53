//! Lead service: scoring, capture, listing.
//!
//! DESIGN
//! ======
//! Leads arrive from marketing forms (`POST /api/leads`) and from the chat
//! widget once a visitor leaves an email or phone number. Both paths go
//! through [`score_lead`] so the admin table ranks them the same way.
//!
//! Status is derived from the raw score before clamping, so a lead whose
//! bonuses push past 100 is still stored with `score = 100`.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::chat::{CollectedFields, Contact};

const BASE_SCORE: i32 = 50;
const HOT_THRESHOLD: i32 = 70;
const WARM_THRESHOLD: i32 = 40;

pub const DEFAULT_SOURCE: &str = "web_form";
pub const CHATBOT_SOURCE: &str = "chatbot";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    #[error("Email is required")]
    MissingEmail,
    #[error("could not encode lead details: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Hot,
    Warm,
    Cold,
}

impl LeadStatus {
    #[must_use]
    pub fn from_score(score: i32) -> Self {
        if score >= HOT_THRESHOLD {
            Self::Hot
        } else if score >= WARM_THRESHOLD {
            Self::Warm
        } else {
            Self::Cold
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Cold => "cold",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utm {
    pub campaign: Option<String>,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub content: Option<String>,
    pub term: Option<String>,
}

/// How the visitor interacted with the product demo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoEngagement {
    pub completed: bool,
    pub replayed: bool,
    pub paused_at_key_moments: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponses {
    pub timeline: Option<String>,
    pub volume: Option<String>,
    pub challenge: Option<String>,
}

/// Body of `POST /api/leads`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub utm: Option<Utm>,
    pub notes: Option<String>,
    pub demo_engagement: Option<DemoEngagement>,
    pub survey_responses: Option<SurveyResponses>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadScore {
    /// Clamped to 0..=100.
    pub score: i32,
    pub status: LeadStatus,
}

/// A lead ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: String,
    pub utm: Utm,
    pub score: LeadScore,
    pub notes: Option<String>,
    pub demo_engagement: Option<DemoEngagement>,
    pub survey_responses: Option<SurveyResponses>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: String,
    pub utm_campaign: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
    pub score: i32,
    pub notes: Option<String>,
    pub demo_engagement: Option<serde_json::Value>,
    pub survey_responses: Option<serde_json::Value>,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// =============================================================================
// SCORING
// =============================================================================

/// Score a submission: base 50 plus source, demo and survey bonuses.
#[must_use]
pub fn score_lead(submission: &LeadSubmission) -> LeadScore {
    let mut score = BASE_SCORE;

    score += match submission.source.as_deref() {
        Some("demo_page") => 20,
        Some("pricing_page") => 15,
        Some("hero_form") => 10,
        _ => 0,
    };

    if let Some(demo) = &submission.demo_engagement {
        if demo.completed {
            score += 25;
        }
        if demo.replayed {
            score += 15;
        }
        if demo.paused_at_key_moments {
            score += 10;
        }
    }

    if let Some(survey) = &submission.survey_responses {
        if survey.timeline.as_deref() == Some("this_week") {
            score += 20;
        }
        if survey.volume.as_deref() == Some("10+") {
            score += 15;
        }
        if survey.challenge.as_deref().is_some_and(|c| !c.is_empty()) {
            score += 5;
        }
    }

    LeadScore { score: score.clamp(0, 100), status: LeadStatus::from_score(score) }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Validate a form submission and turn it into an insertable lead.
///
/// # Errors
///
/// Returns [`LeadError::MissingEmail`] when no email is present.
pub fn prepare_lead(submission: LeadSubmission) -> Result<NewLead, LeadError> {
    let score = score_lead(&submission);
    let email = non_empty(submission.email).ok_or(LeadError::MissingEmail)?;
    Ok(NewLead {
        name: non_empty(submission.name),
        email: Some(email),
        phone: non_empty(submission.phone),
        source: non_empty(submission.source).unwrap_or_else(|| DEFAULT_SOURCE.to_owned()),
        utm: submission.utm.unwrap_or_default(),
        score,
        notes: non_empty(submission.notes),
        demo_engagement: submission.demo_engagement,
        survey_responses: submission.survey_responses,
    })
}

/// Build the lead recorded when the chat widget captures a contact.
#[must_use]
pub fn chat_lead(contact: &Contact, fields: &CollectedFields) -> NewLead {
    let submission = LeadSubmission { source: Some(CHATBOT_SOURCE.to_owned()), ..LeadSubmission::default() };
    let (email, phone) = match contact {
        Contact::Email(email) => (Some(email.clone()), None),
        Contact::Phone(phone) => (None, Some(phone.clone())),
    };
    let summary = fields.summary();
    NewLead {
        name: None,
        email,
        phone,
        source: CHATBOT_SOURCE.to_owned(),
        utm: Utm::default(),
        score: score_lead(&submission),
        notes: (!summary.is_empty()).then_some(summary),
        demo_engagement: None,
        survey_responses: None,
    }
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Encode an optional JSONB column.
pub(crate) fn to_jsonb<T: Serialize>(value: Option<&T>) -> Result<Option<serde_json::Value>, LeadError> {
    Ok(value.map(serde_json::to_value).transpose()?)
}

/// Insert a lead and return its ID.
///
/// # Errors
///
/// Returns an encode error if the engagement or survey details cannot be
/// serialized, or a database error if the insert fails.
pub async fn insert_lead(pool: &PgPool, lead: &NewLead) -> Result<Uuid, LeadError> {
    let id = Uuid::new_v4();
    let demo = to_jsonb(lead.demo_engagement.as_ref())?;
    let survey = to_jsonb(lead.survey_responses.as_ref())?;

    sqlx::query(
        r"INSERT INTO leads (
              id, name, email, phone, source,
              utm_campaign, utm_source, utm_medium, utm_content, utm_term,
              score, notes, demo_engagement, survey_responses, status
          ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
    )
    .bind(id)
    .bind(&lead.name)
    .bind(&lead.email)
    .bind(&lead.phone)
    .bind(&lead.source)
    .bind(&lead.utm.campaign)
    .bind(&lead.utm.source)
    .bind(&lead.utm.medium)
    .bind(&lead.utm.content)
    .bind(&lead.utm.term)
    .bind(lead.score.score)
    .bind(&lead.notes)
    .bind(demo)
    .bind(survey)
    .bind(lead.score.status.as_str())
    .execute(pool)
    .await?;

    Ok(id)
}

/// List leads newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_leads(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<LeadRow>, LeadError> {
    let rows = sqlx::query_as::<_, LeadRow>(
        r"SELECT id, name, email, phone, source,
                 utm_campaign, utm_source, utm_medium, utm_content, utm_term,
                 score, notes, demo_engagement, survey_responses, status, created_at
          FROM leads
          ORDER BY created_at DESC
          LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Delete every lead. Returns the number of rows removed.
///
/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn clear_leads(pool: &PgPool) -> Result<u64, LeadError> {
    let result = sqlx::query("DELETE FROM leads").execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
#[path = "leads_test.rs"]
mod tests;
