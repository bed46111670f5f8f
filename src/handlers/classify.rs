//! Keyword classification endpoint
//!
//! Classifies against one of the embedded tables. The domain table also
//! reports its single best pick.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::classify::{CategoryScore, DomainMatch, KeywordClassifier};
use crate::handlers::{AppState, bounded_text};
use crate::metrics::record_or_warn;
use crate::middleware::RequestId;
use crate::pipeline::TableKind;

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    #[serde(deserialize_with = "bounded_text")]
    text: String,
    #[serde(default)]
    table: TableKind,
}

impl ClassifyRequest {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn table(&self) -> TableKind {
        self.table
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResponse {
    pub table: TableKind,
    pub categories: BTreeSet<String>,
    pub scores: Vec<CategoryScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_match: Option<DomainMatch>,
    pub request_id: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ClassifyRequest>,
) -> Json<ClassifyResponse> {
    let engine = state.engine();
    let table = engine.table(request.table());
    let classifier = KeywordClassifier::new();

    let scores = classifier.scores(request.text(), table);
    let categories: BTreeSet<String> = scores
        .iter()
        .filter(|s| s.matched)
        .map(|s| s.category.clone())
        .collect();
    let best_match = match request.table() {
        TableKind::Domain => classifier.best_match(request.text(), table),
        TableKind::Chat => None,
    };

    tracing::debug!(
        request_id = %request_id,
        table = table.name(),
        matched = categories.len(),
        "Text classified"
    );

    let metrics = state.metrics();
    record_or_warn(
        metrics,
        "record_category_matches",
        metrics.record_category_matches(table.name(), &categories),
    );

    Json(ClassifyResponse {
        table: request.table(),
        categories,
        scores,
        best_match,
        request_id: request_id.to_string(),
    })
}
