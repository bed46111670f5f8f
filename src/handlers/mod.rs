//! HTTP request handlers for the tolkroute API
//!
//! A thin JSON surface over the decision engine. Handlers never call a
//! model backend; `/v1/route` returns the plan an invoker would execute.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::AppResult;
use crate::metrics::Metrics;
use crate::middleware::request_id_middleware;
use crate::pipeline::DecisionEngine;

pub mod classify;
pub mod detect;
pub mod health;
pub mod metrics;
pub mod route;

/// Longest accepted message, in characters
pub const MAX_TEXT_LENGTH: usize = 100_000;

/// Longest accepted tier name
const MAX_TIER_LENGTH: usize = 64;

/// Application state shared across all handlers
///
/// All fields are Arc'd for cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    engine: Arc<DecisionEngine>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Build the decision engine and metrics registry
    ///
    /// # Errors
    /// Fails if the engine cannot be built from `config` or metric
    /// registration fails.
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let engine = Arc::new(DecisionEngine::new(&config)?);
        let metrics = Arc::new(Metrics::new().map_err(|e| {
            crate::error::AppError::Internal(format!("failed to register metrics: {}", e))
        })?);
        Ok(Self {
            config,
            engine,
            metrics,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn metrics_arc(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }
}

/// Full HTTP application with tracing and request-ID layers
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/v1/detect", post(detect::handler))
        .route("/v1/classify", post(classify::handler))
        .route("/v1/route", post(route::handler))
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

/// Deserialize message text, enforcing the length limit
///
/// Empty text is accepted; detection and classification are total.
pub(crate) fn bounded_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let char_count = text.chars().count();
    if char_count > MAX_TEXT_LENGTH {
        return Err(serde::de::Error::custom(format!(
            "text exceeds maximum length of {} characters (got {})",
            MAX_TEXT_LENGTH, char_count
        )));
    }
    Ok(text)
}

/// Deserialize an optional tier name
pub(crate) fn bounded_tier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let tier = Option::<String>::deserialize(deserializer)?;
    if let Some(name) = &tier {
        if name.trim().is_empty() {
            return Err(serde::de::Error::custom("tier cannot be empty"));
        }
        if name.len() > MAX_TIER_LENGTH {
            return Err(serde::de::Error::custom(format!(
                "tier exceeds maximum length of {} bytes",
                MAX_TIER_LENGTH
            )));
        }
    }
    Ok(tier)
}
