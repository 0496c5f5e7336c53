//! Market search service: live listings from the scraping backend with a
//! direct-link fallback.
//!
//! DESIGN
//! ======
//! The remote backend is optional and often slow or down. Any failure, or a
//! reply with no listings, degrades to search links on the four big car
//! marketplaces so the page never comes back empty. Only a missing search
//! term is an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::BackendConfig;

const SCRAPING_PATH: &str = "/api/v1/market-search/scraping";
const MAX_RESULTS: u32 = 20;
const SOURCES: [&str; 2] = ["ebay", "cargurus"];
const DEFAULT_ZIP: &str = "10001";
const VARIOUS: &str = "Various";
const VARIOUS_LOCATIONS: &str = "Various locations";

const LIVE_MESSAGE: &str =
    "Live data from real marketplace scraping - click any link to view the actual vehicle posting";
const DIRECT_MESSAGE: &str = "Direct marketplace links - click any link to view actual vehicle listings";
const DIRECT_SUMMARY_MESSAGE: &str =
    "Direct links to marketplace search results - click to view actual vehicle listings";

static MODEL_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid model year regex"));

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("searchTerm is required")]
    MissingSearchTerm,
    #[error("http client build failed: {0}")]
    HttpClientBuild(String),
    #[error("backend request failed: {0}")]
    Request(String),
    #[error("backend returned {status}: {body}")]
    Response { status: u16, body: String },
    #[error("backend response parse failed: {0}")]
    Parse(String),
}

/// Body of `POST /api/v1/market-search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSearchRequest {
    pub search_term: Option<String>,
    pub location: Option<String>,
    pub radius: Option<u32>,
}

/// Payload sent to the scraping backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeRequest {
    pub search_term: String,
    pub location: Option<String>,
    pub radius: Option<u32>,
    pub max_results: u32,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScrapeResponse {
    pub success: bool,
    pub results: Vec<ScrapedListing>,
    pub summary: Option<Value>,
}

/// One listing as the backend reports it. Every field is optional upstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScrapedListing {
    pub source: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub mileage: Option<f64>,
    pub year: Option<Value>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub url: Option<String>,
    pub primary_image: Option<String>,
    pub image_urls: Vec<String>,
    pub listing_id: Option<String>,
    pub title: Option<String>,
    pub is_direct_listing: bool,
    pub deal_score: Option<f64>,
    pub seller_name: Option<String>,
    pub vin: Option<String>,
}

/// A listing as the site renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketListing {
    pub source: String,
    pub price: String,
    pub location: String,
    pub mileage: String,
    pub year: String,
    pub make: String,
    pub model: String,
    pub url: String,
    /// Front-end reads this one in snake case.
    #[serde(rename = "image_url")]
    pub image_url: String,
    pub listing_id: String,
    pub description: String,
    pub is_direct_listing: bool,
    pub deal_score: f64,
    pub dealer_name: String,
    pub vin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min: u64,
    pub max: u64,
}

/// Summary attached to fallback results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectSummary {
    pub total_listings: usize,
    pub average_price: u64,
    pub price_range: PriceRange,
    pub sources: Vec<String>,
    pub search_term: String,
    pub is_real_data: bool,
    pub is_direct_listings: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchSummary {
    Live(Value),
    Direct(DirectSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSearchResponse {
    pub success: bool,
    pub results: Vec<MarketListing>,
    pub summary: SearchSummary,
    pub message: String,
}

// =============================================================================
// BACKEND
// =============================================================================

/// Scraping backend. Object-safe so tests can swap in a canned reply.
#[async_trait::async_trait]
pub trait MarketBackend: Send + Sync {
    /// Run a marketplace scrape.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError`] when the backend is unreachable, replies with
    /// a non-200 status, or sends a body that does not parse.
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, MarketError>;
}

pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::HttpClientBuild`] if reqwest rejects the config.
    pub fn new(config: &BackendConfig) -> Result<Self, MarketError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| MarketError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_owned() })
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<String, MarketError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| MarketError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| MarketError::Request(e.to_string()))?;
        if status != 200 {
            return Err(MarketError::Response { status, body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl MarketBackend for BackendClient {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, MarketError> {
        let text = self.send_json(SCRAPING_PATH, request).await?;
        serde_json::from_str(&text).map_err(|e| MarketError::Parse(e.to_string()))
    }
}

// =============================================================================
// SEARCH
// =============================================================================

/// Search the market for `request.search_term`.
///
/// # Errors
///
/// Returns [`MarketError::MissingSearchTerm`] when the term is blank. Backend
/// failures never surface; they fall back to direct links.
pub async fn search(
    backend: Option<&dyn MarketBackend>,
    request: MarketSearchRequest,
) -> Result<MarketSearchResponse, MarketError> {
    let term = request
        .search_term
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .ok_or(MarketError::MissingSearchTerm)?;
    let location = request
        .location
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty());

    if let Some(backend) = backend {
        let scrape = ScrapeRequest {
            search_term: term.clone(),
            location: location.clone(),
            radius: request.radius,
            max_results: MAX_RESULTS,
            sources: SOURCES.iter().map(|s| (*s).to_owned()).collect(),
        };
        match backend.scrape(&scrape).await {
            Ok(reply) if reply.success && !reply.results.is_empty() => {
                info!(term = %term, count = reply.results.len(), "market search: live results");
                return Ok(live_response(reply));
            }
            Ok(_) => info!(term = %term, "market search: backend returned no listings"),
            Err(e) => warn!(error = %e, term = %term, "market search: backend unavailable"),
        }
    }

    let results = direct_marketplace_results(&term, location.as_deref(), request.radius);
    Ok(direct_response(&term, results))
}

fn live_response(reply: ScrapeResponse) -> MarketSearchResponse {
    let results = reply
        .results
        .into_iter()
        .enumerate()
        .map(|(index, listing)| listing_from_scrape(listing, index))
        .collect();
    MarketSearchResponse {
        success: true,
        results,
        summary: SearchSummary::Live(reply.summary.unwrap_or(Value::Null)),
        message: LIVE_MESSAGE.to_owned(),
    }
}

fn direct_response(term: &str, results: Vec<MarketListing>) -> MarketSearchResponse {
    let mut sources: Vec<String> = Vec::new();
    for listing in &results {
        if !sources.contains(&listing.source) {
            sources.push(listing.source.clone());
        }
    }
    let summary = DirectSummary {
        total_listings: results.len(),
        average_price: 0,
        price_range: PriceRange { min: 0, max: 0 },
        sources,
        search_term: term.to_owned(),
        is_real_data: true,
        is_direct_listings: true,
        message: DIRECT_SUMMARY_MESSAGE.to_owned(),
    };
    MarketSearchResponse {
        success: true,
        results,
        summary: SearchSummary::Direct(summary),
        message: DIRECT_MESSAGE.to_owned(),
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Group digits with commas: `45000` -> `"45,000"`.
#[must_use]
pub fn with_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Positive amounts rounded to whole units; zero or negative counts as absent.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole(value: Option<f64>) -> Option<u64> {
    value.filter(|v| v.is_finite() && *v >= 0.5).map(|v| v.round() as u64)
}

#[must_use]
pub fn format_price(price: Option<f64>) -> String {
    whole(price).map_or_else(|| "Price on request".to_owned(), |p| format!("${}", with_thousands(p)))
}

#[must_use]
pub fn format_mileage(mileage: Option<f64>) -> String {
    whole(mileage).map_or_else(
        || "Mileage not specified".to_owned(),
        |m| format!("{} miles", with_thousands(m)),
    )
}

fn text_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

fn year_text(year: Option<&Value>) -> String {
    match year {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_owned(),
        _ => VARIOUS.to_owned(),
    }
}

fn listing_from_scrape(listing: ScrapedListing, index: usize) -> MarketListing {
    let year = year_text(listing.year.as_ref());
    let make = text_or(listing.make, VARIOUS);
    let model = text_or(listing.model, VARIOUS);
    let description = listing
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| format!("{year} {make} {model}"));
    let image_url = listing
        .primary_image
        .or_else(|| listing.image_urls.into_iter().next())
        .unwrap_or_default();

    MarketListing {
        source: listing.source.unwrap_or_default(),
        price: format_price(listing.price),
        location: text_or(listing.location, VARIOUS_LOCATIONS),
        mileage: format_mileage(listing.mileage),
        year,
        make,
        model,
        url: listing.url.unwrap_or_default(),
        image_url,
        listing_id: listing.listing_id.unwrap_or_else(|| format!("listing-{}", index + 1)),
        description,
        is_direct_listing: listing.is_direct_listing,
        deal_score: listing.deal_score.unwrap_or(0.5),
        dealer_name: listing.seller_name.unwrap_or_default(),
        vin: listing.vin.unwrap_or_default(),
    }
}

// =============================================================================
// FALLBACK
// =============================================================================

fn search_url(base: &str, params: &[(&str, &str)]) -> String {
    reqwest::Url::parse_with_params(base, params).map_or_else(|_| base.to_owned(), String::from)
}

/// Links to the search pages of the major marketplaces, used when the
/// scraping backend has nothing to offer.
#[must_use]
pub fn direct_marketplace_results(term: &str, location: Option<&str>, radius: Option<u32>) -> Vec<MarketListing> {
    let year = MODEL_YEAR
        .find(term)
        .map_or_else(|| VARIOUS.to_owned(), |m| m.as_str().to_owned());
    let mut words = term.split_whitespace();
    let make = words.next().unwrap_or(VARIOUS).to_owned();
    let rest: Vec<&str> = words.collect();
    let model = if rest.is_empty() { VARIOUS.to_owned() } else { rest.join(" ") };

    let zip = location.unwrap_or(DEFAULT_ZIP);
    let radius = radius.unwrap_or(0).to_string();
    let sites = [
        (
            "eBay Motors",
            "ebay",
            search_url("https://www.ebay.com/sch/Cars-Trucks/6001/i.html", &[("_nkw", term)]),
        ),
        (
            "CarGurus",
            "cargurus",
            search_url("https://www.cargurus.com/Cars/searchresults.action", &[("search", term)]),
        ),
        (
            "Cars.com",
            "cars-com",
            search_url("https://www.cars.com/shopping/results/", &[("keyword", term)]),
        ),
        (
            "AutoTrader",
            "autotrader",
            search_url(
                "https://www.autotrader.com/cars-for-sale/all-cars",
                &[("zip", zip), ("searchRadius", radius.as_str()), ("sortBy", "relevance")],
            ),
        ),
    ];

    sites
        .into_iter()
        .map(|(source, slug, url)| MarketListing {
            source: source.to_owned(),
            price: format!("View prices on {source}"),
            location: VARIOUS_LOCATIONS.to_owned(),
            mileage: "See listing details".to_owned(),
            year: year.clone(),
            make: make.clone(),
            model: model.clone(),
            url,
            image_url: String::new(),
            listing_id: format!("{slug}-direct-1"),
            description: format!("{term} listings on {source}"),
            is_direct_listing: true,
            deal_score: 0.5,
            dealer_name: String::new(),
            vin: String::new(),
        })
        .collect()
}

#[cfg(test)]
#[path = "market_test.rs"]
mod tests;
