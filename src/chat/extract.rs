//! Field extraction from free-text chat input.
//!
//! Each extractor returns the text exactly as it appeared in the message.
//! No normalization happens here; callers store what was typed.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MIN_YEAR: u16 = 1900;
pub const MAX_YEAR: u16 = 2100;

/// Words kept after the year when describing the vehicle.
const MAX_VEHICLE_WORDS: usize = 3;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("year regex"));

static MILEAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?\s?k|\d+)\s*(?:miles?|mi)\b").expect("mileage regex")
});

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(clean|rebuilt|salvage)\b").expect("title regex"));

static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{5}(?:-\d{4})?)\b").expect("zip regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,})\b").expect("email regex"));

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)((?:\+?1[\s.-]?)?(?:\(\d{3}\)|\d{3})[\s.-]?\d{3}[\s.-]?\d{4})(?:\D|$)").expect("phone regex")
});

/// How the user asked to be reached once they declined to sign in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Contact {
    Email(String),
    Phone(String),
}

impl Contact {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(v) | Self::Phone(v) => v,
        }
    }
}

fn find_year(input: &str) -> Option<regex::Match<'_>> {
    YEAR_RE
        .captures_iter(input)
        .filter_map(|caps| caps.get(1))
        .find(|m| {
            m.as_str()
                .parse::<u16>()
                .is_ok_and(|y| (MIN_YEAR..=MAX_YEAR).contains(&y))
        })
}

/// First 4-digit token within [`MIN_YEAR`, `MAX_YEAR`].
#[must_use]
pub fn extract_year(input: &str) -> Option<String> {
    find_year(input).map(|m| m.as_str().to_owned())
}

/// Make/model words following the year, e.g. `"Honda Civic"` from
/// `"2018 Honda Civic"`. Stops at the first clause break.
#[must_use]
pub fn extract_vehicle(input: &str) -> Option<String> {
    let rest = &input[find_year(input)?.end()..];
    let clause = rest.split([',', '.', ';', '!', '?', '\n']).next().unwrap_or_default();
    let words: Vec<&str> = clause.split_whitespace().take(MAX_VEHICLE_WORDS).collect();
    if words.is_empty() { None } else { Some(words.join(" ")) }
}

/// Numeric part of a "N miles" phrase: `"45,000"`, `"45k"`, `"120000"`.
#[must_use]
pub fn extract_mileage(input: &str) -> Option<String> {
    MILEAGE_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// One of clean / rebuilt / salvage, case as typed.
#[must_use]
pub fn extract_title_status(input: &str) -> Option<String> {
    TITLE_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Five-digit ZIP, optionally with a `-NNNN` suffix.
#[must_use]
pub fn extract_zip(input: &str) -> Option<String> {
    ZIP_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

#[must_use]
pub fn extract_email(input: &str) -> Option<String> {
    EMAIL_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

#[must_use]
pub fn extract_phone(input: &str) -> Option<String> {
    PHONE_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Email wins when a message carries both.
#[must_use]
pub fn extract_contact(input: &str) -> Option<Contact> {
    extract_email(input)
        .map(Contact::Email)
        .or_else(|| extract_phone(input).map(Contact::Phone))
}

/// True when the user accepts the sign-in gate.
#[must_use]
pub fn wants_sign_in(input: &str) -> bool {
    let lowered = input.to_lowercase();
    lowered.contains("sign") || lowered.contains("login")
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
