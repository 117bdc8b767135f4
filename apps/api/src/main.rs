mod config;
mod errors;
mod llm_client;
mod models;
mod routes;
mod screening;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{ChatBackend, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::JsonFileStore;

const SESSION_PRUNE_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hiring Assistant v{}", env!("CARGO_PKG_VERSION"));

    // Each session probes the backend when it is created and falls back to
    // offline replies if the probe fails.
    let backend: Option<Arc<dyn ChatBackend>> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(client) as Arc<dyn ChatBackend>)
        }
        None => {
            info!("No usable ANTHROPIC_API_KEY; sessions will run in offline mode");
            None
        }
    };

    let store = Arc::new(JsonFileStore::new(config.candidate_data_dir.clone()));
    info!("Candidate records directory: {}", store.dir().display());

    let state = AppState::new(config.clone(), backend, store);

    // Spawn session pruning task
    let pruner = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SESSION_PRUNE_INTERVAL_SECS));
        interval.tick().await; // Skip immediate first tick
        loop {
            interval.tick().await;
            pruner.prune_stale_sessions().await;
        }
    });
    info!(
        "Idle sessions expire after {}s",
        config.session_idle_timeout.as_secs()
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
