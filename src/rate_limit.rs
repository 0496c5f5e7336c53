//! In-memory rate limiting for public write endpoints.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<String, VecDeque<Instant>>`.
//! Two limits are enforced on lead capture, signups, activity and chat:
//! - Per-client: 30 requests/min (client = forwarded IP)
//! - Global: 600 requests/min
//!
//! Empty per-client windows are dropped on every check so the map does not
//! grow with one-off visitors.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::http::HeaderMap;

use crate::config::env_parse;

const DEFAULT_PER_CLIENT_LIMIT: usize = 30;
const DEFAULT_PER_CLIENT_WINDOW_SECS: u64 = 60;

const DEFAULT_GLOBAL_LIMIT: usize = 600;
const DEFAULT_GLOBAL_WINDOW_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_client_limit: usize,
    pub per_client_window: Duration,
    pub global_limit: usize,
    pub global_window: Duration,
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            per_client_limit: env_parse("RATE_LIMIT_PER_CLIENT", DEFAULT_PER_CLIENT_LIMIT),
            per_client_window: Duration::from_secs(env_parse(
                "RATE_LIMIT_PER_CLIENT_WINDOW_SECS",
                DEFAULT_PER_CLIENT_WINDOW_SECS,
            )),
            global_limit: env_parse("RATE_LIMIT_GLOBAL", DEFAULT_GLOBAL_LIMIT),
            global_window: Duration::from_secs(env_parse("RATE_LIMIT_GLOBAL_WINDOW_SECS", DEFAULT_GLOBAL_WINDOW_SECS)),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_client_limit: DEFAULT_PER_CLIENT_LIMIT,
            per_client_window: Duration::from_secs(DEFAULT_PER_CLIENT_WINDOW_SECS),
            global_limit: DEFAULT_GLOBAL_LIMIT,
            global_window: Duration::from_secs(DEFAULT_GLOBAL_WINDOW_SECS),
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("per-client rate limit exceeded (max {limit} requests/{window_secs}s)")]
    PerClientExceeded { limit: usize, window_secs: u64 },
    #[error("global rate limit exceeded (max {limit} requests/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    config: RateLimitConfig,
}

struct RateLimiterInner {
    client_requests: HashMap<String, VecDeque<Instant>>,
    global_requests: VecDeque<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                client_requests: HashMap::new(),
                global_requests: VecDeque::new(),
            })),
            config,
        }
    }

    /// Check both per-client and global limits, then record the request.
    ///
    /// # Errors
    ///
    /// Returns which limit was hit; nothing is recorded in that case.
    pub fn check_and_record(&self, client: &str) -> Result<(), RateLimitError> {
        self.check_and_record_at(client, Instant::now())
    }

    pub(crate) fn check_and_record_at(&self, client: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;

        prune_window(&mut inner.global_requests, now, cfg.global_window);
        if inner.global_requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        inner.client_requests.retain(|_, deque| {
            prune_window(deque, now, cfg.per_client_window);
            !deque.is_empty()
        });
        let client_deque = inner.client_requests.entry(client.to_owned()).or_default();
        if client_deque.len() >= cfg.per_client_limit {
            return Err(RateLimitError::PerClientExceeded {
                limit: cfg.per_client_limit,
                window_secs: cfg.per_client_window.as_secs(),
            });
        }

        client_deque.push_back(now);
        inner.global_requests.push_back(now);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn tracked_clients(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .client_requests
            .len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::from_env())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Best-effort client key: first `x-forwarded-for` hop, then `x-real-ip`.
#[must_use]
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .unwrap_or("unknown")
        .to_owned()
}

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
