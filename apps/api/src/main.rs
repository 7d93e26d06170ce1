mod analysis;
mod config;
mod documents;
mod errors;
mod llm_client;
mod matching;
mod programs;
mod quota;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing upstream keys)
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

    info!("Starting matchmaker API v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::from_config(config.clone())?;
    info!(
        sources = state.aggregator.adapters().len(),
        recurring_programs = state.catalog.len(),
        "Program sources initialized"
    );
    if state.catalog.is_empty() {
        warn!("Recurring program catalog is empty; expected-program lists will be empty");
    }
    info!(
        "LLM client targets {} (model: {})",
        config.llm_api_url,
        llm_client::MODEL
    );
    if state.demo_enabled() {
        info!(daily_limit = config.demo_daily_limit, "Demo mode enabled");
    } else {
        info!("Demo mode disabled (DEMO_LLM_API_KEY not set)");
    }

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
