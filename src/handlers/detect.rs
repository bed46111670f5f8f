//! Language detection endpoint

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::detect::DetectionResult;
use crate::handlers::{AppState, bounded_text};
use crate::metrics::record_or_warn;
use crate::middleware::RequestId;

/// Detection request
///
/// Length is checked during deserialization; an oversized body is a 422.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectRequest {
    #[serde(deserialize_with = "bounded_text")]
    text: String,
}

impl DetectRequest {
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectResponse {
    #[serde(flatten)]
    pub language: DetectionResult,
    pub request_id: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<DetectRequest>,
) -> Json<DetectResponse> {
    let language = state.engine().detect(request.text());

    tracing::debug!(
        request_id = %request_id,
        language = %language.code(),
        confidence = language.confidence(),
        method = language.method().as_str(),
        "Language detected"
    );

    let metrics = state.metrics();
    record_or_warn(
        metrics,
        "record_detection",
        metrics.record_detection(language.code(), language.method()),
    );

    Json(DetectResponse {
        language,
        request_id: request_id.to_string(),
    })
}
