//! # gate-api: Binary Entry Point
//!
//! Loads configuration from the environment, builds the token service, and
//! serves the HTTP API. Any configuration or key error aborts startup.

use std::sync::Arc;

use gate_api::users::StaticUserDirectory;
use gate_api::{AppConfig, AppState};
use gate_token::TokenService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("configuration error: {e}");
        e
    })?;

    let tokens = TokenService::new(config.token.clone()).map_err(|e| {
        tracing::error!("token service cannot start: {e}");
        e
    })?;
    tracing::info!(
        issuer = %tokens.issuer(),
        lifetime_hours = tokens.lifetime().num_hours(),
        retired_keys = tokens.keys().retired_len(),
        "token service ready"
    );

    let users = match &config.user_directory {
        Some(path) => {
            let dir = StaticUserDirectory::load(path).map_err(|e| {
                tracing::error!(path = %path.display(), "user directory error: {e}");
                e
            })?;
            tracing::info!(users = dir.len(), "user directory loaded");
            dir
        }
        None => {
            tracing::warn!("USER_DIRECTORY not set; every login will be rejected");
            StaticUserDirectory::default()
        }
    };

    let state = AppState::new(Arc::new(tokens), Arc::new(users));
    let app = gate_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("tokengate API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
