use axum::{extract::State, Json};
use serde_json::{json, Map, Value};

use crate::state::AppState;

/// GET /health
/// Probes every source adapter with a one-record request and reports the
/// remaining demo quota.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let probes = state.aggregator.probe_all().await;

    let apis: Map<String, Value> = probes
        .into_iter()
        .map(|p| {
            let status = if p.connected { "connected" } else { "error" };
            (p.slug.to_string(), Value::from(status))
        })
        .collect();

    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "apis": apis,
        "demo": {
            "enabled": state.demo_enabled(),
            "dailyLimit": state.quota.limit(),
            "remaining": state.quota.remaining(),
        }
    }))
}

/// GET /
pub async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    let sources: Vec<Value> = state
        .aggregator
        .adapters()
        .iter()
        .map(|a| json!({"slug": a.slug(), "label": a.label()}))
        .collect();

    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "sources": sources,
        "endpoints": [
            "/api/programs/all",
            "/api/programs/expected",
            "/api/programs/:source",
            "/analyze",
            "/match",
            "/proposal",
            "/slides",
            "/demo/analyze",
            "/demo/match",
            "/demo/proposal",
            "/demo/slides",
            "/health"
        ]
    }))
}
