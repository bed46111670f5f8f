//! Health check endpoint
//!
//! Provides a simple health check for monitoring and load balancers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Number of languages in the loaded lexicon
    pub languages: usize,
    /// Configured tiers, lowest rank first
    pub tiers: Vec<String>,
    /// Metrics status: "operational" or "degraded"
    pub metrics_status: &'static str,
}

/// Health check handler
///
/// Metrics status is "degraded" once any metrics recording has failed.
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let metrics_status = if state.metrics().metrics_recording_failures_count() > 0 {
        "degraded"
    } else {
        "operational"
    };

    let engine = state.engine();
    let tiers = engine
        .router()
        .tiers()
        .iter()
        .map(|t| t.name().to_string())
        .collect();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            languages: engine.detector().lexicon().profiles().len(),
            tiers,
            metrics_status,
        }),
    )
}
