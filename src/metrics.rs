//! Prometheus metrics collection for tolkroute
//!
//! Tracks:
//! - Language detections by language and deciding stage
//! - Category matches by table
//! - Route plans by tier and escalation
//! - Routing latency
//! - Backend invocation attempts and fallback substitutions
//!
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.

use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use crate::detect::DetectionMethod;

/// Outcome of one backend invocation attempt
///
/// A closed set keeps label cardinality fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    /// Failed with an error worth retrying
    Retryable,
    /// Failed with an error that is never retried
    Rejected,
    /// Skipped because the provider's circuit is open
    CircuitOpen,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Retryable => "retryable",
            Self::Rejected => "rejected",
            Self::CircuitOpen => "circuit_open",
        }
    }
}

/// Metrics collector for tolkroute
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    detections_total: CounterVec,
    category_matches_total: CounterVec,
    routes_total: CounterVec,
    routing_duration: Histogram,
    invocation_attempts_total: CounterVec,
    invocation_fallbacks_total: CounterVec,
    metrics_recording_failures: IntCounterVec,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create a new Metrics instance with its own registry
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Cardinality: 11 languages x 6 methods
        let detections_total = CounterVec::new(
            Opts::new(
                "tolkroute_detections_total",
                "Total language detections by language code and deciding stage",
            ),
            &["language", "method"],
        )?;

        // Cardinality: bounded by the embedded category tables
        let category_matches_total = CounterVec::new(
            Opts::new(
                "tolkroute_category_matches_total",
                "Total category matches by table and category",
            ),
            &["table", "category"],
        )?;

        // Cardinality: configured tiers x 2
        let routes_total = CounterVec::new(
            Opts::new(
                "tolkroute_routes_total",
                "Total route plans by resolved tier and escalation",
            ),
            &["tier", "escalated"],
        )?;

        let routing_duration = Histogram::with_opts(
            HistogramOpts::new(
                "tolkroute_routing_duration_ms",
                "Detect, classify and route latency in milliseconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0]),
        )?;

        // Cardinality: configured providers x 4 outcomes
        let invocation_attempts_total = CounterVec::new(
            Opts::new(
                "tolkroute_invocation_attempts_total",
                "Backend invocation attempts by provider and outcome",
            ),
            &["provider", "outcome"],
        )?;

        let invocation_fallbacks_total = CounterVec::new(
            Opts::new(
                "tolkroute_invocation_fallbacks_total",
                "Times a tier's fallback target was substituted",
            ),
            &["tier"],
        )?;

        let metrics_recording_failures = IntCounterVec::new(
            Opts::new(
                "tolkroute_metrics_recording_failures_total",
                "Metrics recording operation failures by operation. \
                Indicates Prometheus internal errors.",
            ),
            &["operation"],
        )?;

        registry.register(Box::new(detections_total.clone()))?;
        registry.register(Box::new(category_matches_total.clone()))?;
        registry.register(Box::new(routes_total.clone()))?;
        registry.register(Box::new(routing_duration.clone()))?;
        registry.register(Box::new(invocation_attempts_total.clone()))?;
        registry.register(Box::new(invocation_fallbacks_total.clone()))?;
        registry.register(Box::new(metrics_recording_failures.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            detections_total,
            category_matches_total,
            routes_total,
            routing_duration,
            invocation_attempts_total,
            invocation_fallbacks_total,
            metrics_recording_failures,
        })
    }

    /// Record a language detection
    pub fn record_detection(
        &self,
        language: &str,
        method: DetectionMethod,
    ) -> Result<(), prometheus::Error> {
        self.detections_total
            .get_metric_with_label_values(&[language, method.as_str()])?
            .inc();
        Ok(())
    }

    /// Record every matched category of one classification
    pub fn record_category_matches<'a>(
        &self,
        table: &str,
        categories: impl IntoIterator<Item = &'a String>,
    ) -> Result<(), prometheus::Error> {
        for category in categories {
            self.category_matches_total
                .get_metric_with_label_values(&[table, category.as_str()])?
                .inc();
        }
        Ok(())
    }

    /// Record a route plan
    pub fn record_route(&self, tier: &str, escalated: bool) -> Result<(), prometheus::Error> {
        let escalated = if escalated { "true" } else { "false" };
        self.routes_total
            .get_metric_with_label_values(&[tier, escalated])?
            .inc();
        Ok(())
    }

    /// Record routing latency
    ///
    /// # Errors
    ///
    /// Rejects NaN, infinite and negative durations; they corrupt histogram
    /// percentiles.
    pub fn record_routing_duration(&self, duration_ms: f64) -> Result<(), prometheus::Error> {
        if !duration_ms.is_finite() {
            return Err(prometheus::Error::Msg(format!(
                "Histogram value must be finite (not NaN or Infinity), got: {}",
                duration_ms
            )));
        }
        if duration_ms < 0.0 {
            return Err(prometheus::Error::Msg(format!(
                "Histogram value must be non-negative, got: {}",
                duration_ms
            )));
        }
        self.routing_duration.observe(duration_ms);
        Ok(())
    }

    /// Record one invocation attempt
    pub fn record_invocation_attempt(
        &self,
        provider: &str,
        outcome: AttemptOutcome,
    ) -> Result<(), prometheus::Error> {
        self.invocation_attempts_total
            .get_metric_with_label_values(&[provider, outcome.as_str()])?
            .inc();
        Ok(())
    }

    /// Record a fallback substitution
    pub fn record_fallback(&self, tier: &str) -> Result<(), prometheus::Error> {
        self.invocation_fallbacks_total
            .get_metric_with_label_values(&[tier])?
            .inc();
        Ok(())
    }

    /// Count a failed recording operation
    ///
    /// Callers log and continue; a metrics failure never fails a request.
    pub fn metrics_recording_failure(&self, operation: &str) {
        self.metrics_recording_failures
            .with_label_values(&[operation])
            .inc();
    }

    /// Total metrics recording failures across all operations
    pub fn metrics_recording_failures_count(&self) -> u64 {
        self.registry
            .gather()
            .iter()
            .find(|mf| mf.name() == "tolkroute_metrics_recording_failures_total")
            .map(|mf| {
                mf.get_metric()
                    .iter()
                    .map(|m| m.counter.value.unwrap_or(0.0) as u64)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Encode all metrics in Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns an error if metric encoding fails.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();
        let metric_count = metric_families.len();

        tracing::debug!(
            metric_family_count = metric_count,
            "Encoding metrics to Prometheus text format"
        );

        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();

        encoder.encode(&metric_families, &mut buffer).map_err(|e| {
            tracing::error!(
                error = %e,
                metric_family_count = metric_count,
                "Prometheus text encoder failed"
            );
            prometheus::Error::Msg(format!(
                "Failed to encode {} metric families: {}",
                metric_count, e
            ))
        })?;

        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!(
                "Prometheus encoder produced invalid UTF-8 at byte {}: {}",
                e.utf8_error().valid_up_to(),
                e
            ))
        })
    }
}

/// Log and count a failed metrics call without failing the caller
pub fn record_or_warn(metrics: &Metrics, operation: &str, result: Result<(), prometheus::Error>) {
    if let Err(e) = result {
        tracing::warn!(
            operation = %operation,
            error = %e,
            "Metrics recording failed (request continues)"
        );
        metrics.metrics_recording_failure(operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new_creates_registry() {
        let metrics = Metrics::new().expect("Failed to create metrics");

        metrics
            .record_detection("zu", DetectionMethod::Vocabulary)
            .expect("Test operation should succeed");
        metrics
            .record_category_matches("chat", &["legal".to_string()])
            .expect("Test operation should succeed");
        metrics
            .record_route("pro", true)
            .expect("Test operation should succeed");
        metrics
            .record_routing_duration(0.2)
            .expect("Test operation should succeed");
        metrics
            .record_invocation_attempt("groq", AttemptOutcome::Success)
            .expect("Test operation should succeed");
        metrics
            .record_fallback("pro")
            .expect("Test operation should succeed");

        let output = metrics.gather().expect("Failed to gather");
        assert!(output.contains("tolkroute_detections_total"));
        assert!(output.contains("tolkroute_category_matches_total"));
        assert!(output.contains("tolkroute_routes_total"));
        assert!(output.contains("tolkroute_routing_duration_ms"));
        assert!(output.contains("tolkroute_invocation_attempts_total"));
        assert!(output.contains("tolkroute_invocation_fallbacks_total"));
    }

    #[test]
    fn test_detection_labels_in_output() {
        let metrics = Metrics::new().unwrap();
        metrics
            .record_detection("ve", DetectionMethod::DistinctiveFeature)
            .unwrap();
        let output = metrics.gather().unwrap();
        assert!(output.contains("language=\"ve\""));
        assert!(output.contains("method=\"distinctive_feature\""));
    }

    #[test]
    fn test_route_counter_increments() {
        let metrics = Metrics::new().unwrap();
        metrics.record_route("free", false).unwrap();
        metrics.record_route("free", false).unwrap();
        let output = metrics.gather().unwrap();
        assert!(output.contains("tolkroute_routes_total{escalated=\"false\",tier=\"free\"} 2"));
    }

    #[test]
    fn test_routing_duration_rejects_invalid_values() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.record_routing_duration(f64::NAN).is_err());
        assert!(metrics.record_routing_duration(f64::INFINITY).is_err());
        assert!(metrics.record_routing_duration(-1.0).is_err());
        assert!(metrics.record_routing_duration(0.0).is_ok());
    }

    #[test]
    fn test_record_or_warn_counts_failures() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.metrics_recording_failures_count(), 0);
        record_or_warn(
            &metrics,
            "record_routing_duration",
            metrics.record_routing_duration(f64::NAN),
        );
        assert_eq!(metrics.metrics_recording_failures_count(), 1);
        record_or_warn(&metrics, "record_route", Ok(()));
        assert_eq!(metrics.metrics_recording_failures_count(), 1);
    }

    #[test]
    fn test_attempt_outcome_labels() {
        assert_eq!(AttemptOutcome::Success.as_str(), "success");
        assert_eq!(AttemptOutcome::CircuitOpen.as_str(), "circuit_open");
    }

    #[test]
    fn test_independent_registries() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_route("free", false).unwrap();
        let output = b.gather().unwrap();
        assert!(!output.contains("tier=\"free\""));
    }
}
