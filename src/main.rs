mod chat;
mod config;
mod db;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::market::{BackendClient, MarketBackend};

#[tokio::main]
async fn main() {
    // A missing .env is normal outside local development.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");

    // Market search degrades to direct links without a backend.
    let market: Option<Arc<dyn MarketBackend>> = match &config.backend {
        Some(backend) => match BackendClient::new(backend) {
            Ok(client) => {
                tracing::info!(base_url = %backend.base_url, "market backend configured");
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!(error = %e, "market backend client failed to build; using direct links");
                None
            }
        },
        None => {
            tracing::warn!("BACKEND_URL not set; market search will return direct links");
            None
        }
    };

    let state = state::AppState::new(pool, market);

    let _sweeper = services::sessions::spawn_session_sweeper(state.clone(), config.chat.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "accorria listening");
    axum::serve(listener, app).await.expect("server failed");
}
