mod models;
mod handlers;
mod services;
mod middleware;
mod components;
mod config;
mod errors;
mod state;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use crate::{
    config::Config,
    services::AuthBackend,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Authentication service shared by every request
    let auth = AuthBackend::from_config(&config.auth)
        .context("Failed to set up authentication service client")?;

    let address = format!("{}:{}", config.server.host, config.server.port);
    let app = handlers::router(AppState::new(config, auth));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server running on {}", address);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;
    Ok(())
}
