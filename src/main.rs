mod catalog;
mod config;
mod gemini;
mod models;
mod orchestrator;
mod provider;
mod request;
mod routes;
mod store;
mod upload;

use anyhow::Context;
use routes::AppState;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use std::sync::Arc;

use crate::{config::Config, gemini::GeminiClient, orchestrator::Orchestrator, store::{FileSlot, ResultStore}};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env();
    if config.gemini.api_key.is_some() {
        tracing::info!("🔑 Gemini API key configured, model {}", config.gemini.model);
    } else {
        tracing::warn!("⚠️ GEMINI_API_KEY is not set; every generation will fail until it is");
    }

    tracing::info!("⭐ Favorites stored at {}", config.favorites_path.display());
    let store = ResultStore::load(Box::new(FileSlot::new(&config.favorites_path)));
    let studio = Orchestrator::new(Arc::new(GeminiClient::new(&config.gemini)), store, config.language);
    let app = routes::router(AppState { studio: Arc::new(studio) });

    let addr = SocketAddr::from(([0,0,0,0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("👋 Shutting down");
        })
        .await
        .context("server error")?;
    Ok(())
}
