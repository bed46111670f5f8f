//! Route planning endpoint
//!
//! Runs the full decision pipeline and returns the plan. No model backend is
//! called here.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::handlers::{AppState, bounded_text, bounded_tier};
use crate::metrics::record_or_warn;
use crate::middleware::RequestId;
use crate::pipeline::{Decision, TableKind};

/// Route request
///
/// `tier` is optional; the configured default tier is used when absent and
/// an unknown tier routes as the lowest one.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    #[serde(deserialize_with = "bounded_text")]
    text: String,
    #[serde(default, deserialize_with = "bounded_tier")]
    tier: Option<String>,
}

impl RouteRequest {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tier(&self) -> Option<&str> {
        self.tier.as_deref()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteResponse {
    #[serde(flatten)]
    pub decision: Decision,
    pub request_id: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RouteRequest>,
) -> Json<RouteResponse> {
    tracing::debug!(
        request_id = %request_id,
        text_length = request.text().len(),
        tier = ?request.tier(),
        "Received route request"
    );

    let routing_start = std::time::Instant::now();
    let decision = state.engine().route(request.tier(), request.text());
    let routing_duration_ms = routing_start.elapsed().as_secs_f64() * 1000.0;

    let plan = &decision.plan;
    tracing::info!(
        request_id = %request_id,
        language = %decision.language.code(),
        tier = %plan.tier(),
        target = %plan.target(),
        rule = plan.rule().as_str(),
        escalated = plan.escalated(),
        routing_duration_ms = %routing_duration_ms,
        "Routing decision made"
    );

    let metrics = state.metrics();
    record_or_warn(
        metrics,
        "record_detection",
        metrics.record_detection(decision.language.code(), decision.language.method()),
    );
    record_or_warn(
        metrics,
        "record_category_matches",
        metrics.record_category_matches(
            state.engine().table(TableKind::Chat).name(),
            &decision.categories,
        ),
    );
    record_or_warn(
        metrics,
        "record_route",
        metrics.record_route(plan.tier(), plan.escalated()),
    );
    record_or_warn(
        metrics,
        "record_routing_duration",
        metrics.record_routing_duration(routing_duration_ms),
    );

    Json(RouteResponse {
        decision,
        request_id: request_id.to_string(),
    })
}
