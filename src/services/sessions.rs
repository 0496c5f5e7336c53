//! Chat session service: idle sweep for the in-memory conversation map.
//!
//! DESIGN
//! ======
//! Conversations live only in memory. Visitors rarely close the widget
//! explicitly, so a background task periodically drops any conversation
//! untouched for longer than the configured idle timeout.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::ChatSessionConfig;
use crate::state::AppState;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn the background sweep task. Returns a handle for shutdown.
pub fn spawn_session_sweeper(state: AppState, config: ChatSessionConfig) -> JoinHandle<()> {
    info!(
        idle_secs = config.idle_timeout.as_secs(),
        sweep_secs = config.sweep_interval.as_secs(),
        "chat session sweeper configured"
    );
    let period = config.sweep_interval.max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let removed = sweep_idle(&state, config.idle_timeout, Instant::now()).await;
            if removed > 0 {
                debug!(removed, "dropped idle chat sessions");
            }
        }
    })
}

/// Drop conversations idle for longer than `idle_timeout` as of `now`.
/// Returns how many were removed.
pub(crate) async fn sweep_idle(state: &AppState, idle_timeout: Duration, now: Instant) -> usize {
    let mut conversations = state.conversations.write().await;
    let before = conversations.len();
    conversations.retain(|_, conversation| now.saturating_duration_since(conversation.last_active()) <= idle_timeout);
    before - conversations.len()
}

#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;
