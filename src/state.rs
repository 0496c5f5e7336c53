//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the map of open chat conversations, the
//! optional market-search backend and the public write rate limiter.
//! Conversations are memory-only; the session sweeper drops idle ones.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::chat::Conversation;
use crate::rate_limit::RateLimiter;
use crate::services::market::MarketBackend;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub conversations: Arc<RwLock<HashMap<Uuid, Conversation>>>,
    /// Optional scraping backend. `None` if `BACKEND_URL` is not configured.
    pub market: Option<Arc<dyn MarketBackend>>,
    /// In-memory rate limiter for public write endpoints.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, market: Option<Arc<dyn MarketBackend>>) -> Self {
        Self {
            pool,
            conversations: Arc::new(RwLock::new(HashMap::new())),
            market,
            rate_limiter: RateLimiter::default(),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
