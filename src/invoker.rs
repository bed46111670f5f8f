//! Backend invocation: the collaborator contract and its retry policy
//!
//! tolkroute does not talk to LLM providers itself. A [`BackendInvoker`]
//! executes a [`RoutePlan`]; [`RetryingInvoker`] wraps any invoker with the
//! failure policy:
//!
//! 1. Retry the plan's primary target up to `max_attempts` times with
//!    exponential backoff
//! 2. Substitute the tier's fallback target and try exactly once more
//! 3. Skip straight to the fallback while the primary provider's circuit is
//!    open, letting one trial call through after each cool-down
//!
//! Non-retryable errors surface immediately.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::InvokerConfig;
use crate::error::{AppError, AppResult};
use crate::metrics::{AttemptOutcome, Metrics, record_or_warn};
use crate::router::RoutePlan;

/// Maximum backoff duration in milliseconds (30 seconds)
///
/// With base=100ms attempt 10 would be 51.2 s; it is capped here.
pub const MAX_BACKOFF_MS: u64 = 30_000;

/// One chat turn sent to a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    pub prompt: u32,
    pub completion: u32,
}

/// A backend's reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
    #[serde(default)]
    pub usage: TokenCounts,
}

/// Errors a backend may report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("rate limited by provider")]
    RateLimited,

    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    /// The request itself is unacceptable; retrying cannot help
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl InvokeError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Executes a route plan against a provider
#[async_trait]
pub trait BackendInvoker: Send + Sync {
    async fn invoke(
        &self,
        plan: &RoutePlan,
        messages: &[ChatMessage],
    ) -> Result<Completion, InvokeError>;
}

/// Calculate exponential backoff with overflow protection
///
/// `base * 2^(attempt-1)`, capped at [`MAX_BACKOFF_MS`]. `attempt` is 1-indexed.
pub fn calculate_backoff(base_ms: u64, attempt: u32) -> u64 {
    let exponent = attempt.saturating_sub(1);
    base_ms
        .saturating_mul(2_u64.saturating_pow(exponent))
        .min(MAX_BACKOFF_MS)
}

#[derive(Debug, Clone, Copy, Default)]
struct ProviderCircuit {
    consecutive_failures: u32,
    /// Set while the circuit is open; moved forward when a trial is admitted
    opened_at: Option<Instant>,
}

/// Whether the primary target may be called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitAdmission {
    Closed,
    /// Open, cool-down elapsed: this caller makes the single trial call
    Trial,
    Open,
}

/// Per-provider circuit breaker
///
/// Opens after `failure_threshold` consecutive failures. Once `reset_after`
/// has elapsed one half-open trial call is admitted; a success closes the
/// circuit and a failure re-opens it for another cool-down. Shared by
/// reference; there is no global registry.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    reset_after: Duration,
    circuits: RwLock<HashMap<String, ProviderCircuit>>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, reset_after: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            reset_after,
            circuits: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &InvokerConfig) -> Self {
        Self::new(
            config.circuit_failure_threshold,
            Duration::from_secs(config.circuit_reset_seconds),
        )
    }

    pub async fn is_open(&self, provider: &str) -> bool {
        self.circuits
            .read()
            .await
            .get(provider)
            .is_some_and(|c| c.opened_at.is_some())
    }

    /// Decide whether a call to `provider` may proceed
    ///
    /// Admitting a trial restarts the cool-down, so concurrent callers keep
    /// skipping the provider until the trial reports back.
    pub async fn admit(&self, provider: &str) -> CircuitAdmission {
        let mut circuits = self.circuits.write().await;
        let Some(circuit) = circuits.get_mut(provider) else {
            return CircuitAdmission::Closed;
        };
        match circuit.opened_at {
            None => CircuitAdmission::Closed,
            Some(opened_at) if opened_at.elapsed() >= self.reset_after => {
                circuit.opened_at = Some(Instant::now());
                tracing::info!(provider = %provider, "Provider circuit half-open, admitting trial call");
                CircuitAdmission::Trial
            }
            Some(_) => CircuitAdmission::Open,
        }
    }

    pub async fn consecutive_failures(&self, provider: &str) -> u32 {
        self.circuits
            .read()
            .await
            .get(provider)
            .map_or(0, |c| c.consecutive_failures)
    }

    pub async fn mark_failure(&self, provider: &str) {
        let mut circuits = self.circuits.write().await;
        let circuit = circuits.entry(provider.to_string()).or_default();
        circuit.consecutive_failures += 1;

        if circuit.consecutive_failures >= self.failure_threshold {
            if circuit.opened_at.is_none() {
                tracing::warn!(
                    provider = %provider,
                    consecutive_failures = circuit.consecutive_failures,
                    "Provider circuit opened"
                );
            } else {
                tracing::warn!(
                    provider = %provider,
                    consecutive_failures = circuit.consecutive_failures,
                    "Provider trial call failed, circuit re-opened"
                );
            }
            circuit.opened_at = Some(Instant::now());
        } else {
            tracing::debug!(
                provider = %provider,
                consecutive_failures = circuit.consecutive_failures,
                "Provider failure recorded (circuit still closed)"
            );
        }
    }

    pub async fn mark_success(&self, provider: &str) {
        let mut circuits = self.circuits.write().await;
        let circuit = circuits.entry(provider.to_string()).or_default();
        if circuit.opened_at.is_some() {
            tracing::info!(provider = %provider, "Provider circuit closed after success");
        }
        circuit.consecutive_failures = 0;
        circuit.opened_at = None;
    }
}

/// Result of a successful invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationOutcome {
    pub completion: Completion,
    /// Provider that actually answered
    pub provider: String,
    pub model: String,
    /// Attempts made, fallback included
    pub attempts: u32,
    /// Whether the fallback target answered
    pub substituted: bool,
}

/// Retry, fallback and circuit-breaker wrapper around any invoker
pub struct RetryingInvoker<I> {
    inner: I,
    policy: InvokerConfig,
    circuits: Arc<CircuitBreaker>,
    metrics: Arc<Metrics>,
}

impl<I: BackendInvoker> RetryingInvoker<I> {
    pub fn new(
        inner: I,
        policy: InvokerConfig,
        circuits: Arc<CircuitBreaker>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            inner,
            policy,
            circuits,
            metrics,
        }
    }

    pub fn circuits(&self) -> &CircuitBreaker {
        &self.circuits
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }

    /// Execute `plan`, retrying and substituting the fallback as needed
    ///
    /// # Errors
    /// Returns [`AppError::Invocation`] naming the last target tried.
    pub async fn invoke(
        &self,
        plan: &RoutePlan,
        messages: &[ChatMessage],
    ) -> AppResult<InvocationOutcome> {
        let mut attempts = 0;

        let admission = self.circuits.admit(plan.provider()).await;
        if admission == CircuitAdmission::Open {
            tracing::warn!(
                tier = %plan.tier(),
                provider = %plan.provider(),
                fallback = %plan.fallback(),
                "Primary circuit open, using fallback directly"
            );
            record_or_warn(
                &self.metrics,
                "record_invocation_attempt",
                self.metrics
                    .record_invocation_attempt(plan.provider(), AttemptOutcome::CircuitOpen),
            );
        } else {
            // A half-open trial gets one call; its failure re-opens the circuit
            // and the loop below stops on that.
            for attempt in 1..=self.policy.max_attempts {
                attempts += 1;
                match self.attempt(plan, messages).await {
                    Ok(completion) => {
                        return Ok(InvocationOutcome {
                            completion,
                            provider: plan.provider().to_string(),
                            model: plan.model().to_string(),
                            attempts,
                            substituted: false,
                        });
                    }
                    Err(e) if !e.is_retryable() => {
                        return Err(AppError::Invocation {
                            provider: plan.provider().to_string(),
                            model: plan.model().to_string(),
                            source: e,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(
                            tier = %plan.tier(),
                            provider = %plan.provider(),
                            model = %plan.model(),
                            attempt,
                            max_attempts = self.policy.max_attempts,
                            error = %e,
                            "Invocation attempt failed"
                        );
                        // Stop hammering a provider whose circuit just opened
                        if self.circuits.is_open(plan.provider()).await {
                            break;
                        }
                        if attempt < self.policy.max_attempts {
                            let backoff_ms =
                                calculate_backoff(self.policy.retry_backoff_ms, attempt);
                            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                        }
                    }
                }
            }
        }

        let fallback = plan.with_fallback();
        attempts += 1;
        record_or_warn(
            &self.metrics,
            "record_fallback",
            self.metrics.record_fallback(plan.tier()),
        );
        tracing::info!(
            tier = %plan.tier(),
            primary = %plan.target(),
            fallback = %fallback.target(),
            "Substituting fallback target"
        );

        match self.attempt(&fallback, messages).await {
            Ok(completion) => Ok(InvocationOutcome {
                completion,
                provider: fallback.provider().to_string(),
                model: fallback.model().to_string(),
                attempts,
                substituted: true,
            }),
            Err(e) => {
                tracing::error!(
                    tier = %plan.tier(),
                    provider = %fallback.provider(),
                    model = %fallback.model(),
                    attempts,
                    error = %e,
                    "Fallback invocation failed"
                );
                Err(AppError::Invocation {
                    provider: fallback.provider().to_string(),
                    model: fallback.model().to_string(),
                    source: e,
                })
            }
        }
    }

    /// One timed call with circuit and metrics bookkeeping
    async fn attempt(
        &self,
        plan: &RoutePlan,
        messages: &[ChatMessage],
    ) -> Result<Completion, InvokeError> {
        let seconds = self.policy.request_timeout_seconds;
        let result = match tokio::time::timeout(
            Duration::from_secs(seconds),
            self.inner.invoke(plan, messages),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(InvokeError::Timeout { seconds }),
        };

        let outcome = match &result {
            Ok(_) => {
                self.circuits.mark_success(plan.provider()).await;
                AttemptOutcome::Success
            }
            Err(e) if e.is_retryable() => {
                self.circuits.mark_failure(plan.provider()).await;
                AttemptOutcome::Retryable
            }
            Err(_) => AttemptOutcome::Rejected,
        };
        record_or_warn(
            &self.metrics,
            "record_invocation_attempt",
            self.metrics
                .record_invocation_attempt(plan.provider(), outcome),
        );

        result
    }
}
