//! Tier router for tolkroute
//!
//! Turns a subscription tier, a language detection result and the matched
//! chat categories into a [`RoutePlan`]. Pure and total: no I/O, no errors.

pub mod policy;

pub use policy::{ModelTarget, ModelVariant, SamplingProfile, TierPolicy, builtin_tiers};

use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::RoutingConfig;
use crate::detect::DetectionResult;
use crate::error::AppResult;
use crate::lexicon::categories::{
    DOCUMENT_REQUEST, ESCALATION_CATEGORIES, EXTENDED_CATEGORIES, GENERAL_DOMAIN, IMAGE_REQUEST,
    THINKING,
};

/// Which sampling profile of the chosen variant applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    Standard,
    Reasoning,
}

impl SamplingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Reasoning => "reasoning",
        }
    }
}

/// The decision rule that produced a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRule {
    /// Tier below the paid threshold
    Unpaid,
    /// Paid tier escalated by category or language
    Escalated,
    /// Paid tier in thinking mode on its default variant
    Thinking,
    /// Paid tier default variant
    Default,
}

impl RouteRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Escalated => "escalated",
            Self::Thinking => "thinking",
            Self::Default => "default",
        }
    }
}

/// System-prompt addendum for non-default languages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageContext {
    pub code: String,
    pub name: String,
    pub hybrid: bool,
    pub instruction: String,
}

impl LanguageContext {
    fn for_detection(language: &DetectionResult) -> Self {
        let name = language.name();
        let hybrid = language.is_hybrid();
        let instruction = if hybrid {
            format!(
                "The user appears to be mixing {name} with English. Mirror their code-switching: \
                 reply mainly in {name} and keep English terms where they used them."
            )
        } else {
            format!(
                "The user is writing in {name}. Reply in {name} using natural, culturally \
                 appropriate phrasing."
            )
        };
        Self {
            code: language.code().to_string(),
            name: name.to_string(),
            hybrid,
            instruction,
        }
    }
}

/// Everything a backend invoker needs to execute a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    tier: String,
    provider: String,
    model: String,
    capability: u8,
    sampling: SamplingProfile,
    sampling_mode: SamplingMode,
    max_tokens: u32,
    prompt_variant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_context: Option<LanguageContext>,
    escalated: bool,
    rule: RouteRule,
    categories: Vec<String>,
    fallback: ModelTarget,
}

impl RoutePlan {
    pub fn tier(&self) -> &str {
        &self.tier
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn target(&self) -> ModelTarget {
        ModelTarget::new(&self.provider, &self.model)
    }

    pub fn capability(&self) -> u8 {
        self.capability
    }

    pub fn sampling(&self) -> SamplingProfile {
        self.sampling
    }

    pub fn sampling_mode(&self) -> SamplingMode {
        self.sampling_mode
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn prompt_variant(&self) -> &str {
        &self.prompt_variant
    }

    pub fn language_context(&self) -> Option<&LanguageContext> {
        self.language_context.as_ref()
    }

    pub fn escalated(&self) -> bool {
        self.escalated
    }

    pub fn rule(&self) -> RouteRule {
        self.rule
    }

    /// Matched chat categories, sorted
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn fallback(&self) -> &ModelTarget {
        &self.fallback
    }

    /// Same plan pointed at the tier's fallback target
    pub fn with_fallback(&self) -> Self {
        Self {
            provider: self.fallback.provider.clone(),
            model: self.fallback.model.clone(),
            ..self.clone()
        }
    }
}

/// Inputs to a single routing decision
#[derive(Debug, Clone)]
pub struct RouteContext<'a> {
    pub tier: &'a str,
    pub language: &'a DetectionResult,
    pub categories: &'a BTreeSet<String>,
    /// Best document domain, if any
    pub domain: Option<&'a str>,
}

impl<'a> RouteContext<'a> {
    pub fn new(
        tier: &'a str,
        language: &'a DetectionResult,
        categories: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            tier,
            language,
            categories,
            domain: None,
        }
    }

    pub fn with_domain(mut self, domain: Option<&'a str>) -> Self {
        self.domain = domain;
        self
    }

    fn matched(&self, category: &str) -> bool {
        self.categories.contains(category)
    }
}

/// Deterministic tier decision table
#[derive(Debug, Clone)]
pub struct TierRouter {
    /// Sorted by rank, lowest first
    tiers: Vec<TierPolicy>,
    routing: RoutingConfig,
}

impl TierRouter {
    /// Create a router over a validated tier table
    ///
    /// # Errors
    /// Returns [`crate::error::AppError::Config`] if the tier table is inconsistent.
    pub fn new(mut tiers: Vec<TierPolicy>, routing: RoutingConfig) -> AppResult<Self> {
        policy::validate_tiers(&tiers, routing.paid_threshold_rank)?;
        tiers.sort_by_key(|t| t.rank());
        Ok(Self { tiers, routing })
    }

    pub fn tiers(&self) -> &[TierPolicy] {
        &self.tiers
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    /// Look up a tier, falling back to the lowest-ranked one
    pub fn resolve_tier(&self, name: &str) -> &TierPolicy {
        match self.tiers.iter().find(|t| t.name() == name) {
            Some(tier) => tier,
            None => {
                let lowest = &self.tiers[0];
                tracing::warn!(
                    requested_tier = %name,
                    resolved_tier = %lowest.name(),
                    "Unknown tier, routing as lowest tier"
                );
                lowest
            }
        }
    }

    pub fn is_paid(&self, tier: &TierPolicy) -> bool {
        tier.rank() >= self.routing.paid_threshold_rank
    }

    /// Whether the detected language warrants special handling
    pub fn language_triggers(&self, language: &DetectionResult) -> bool {
        language.code() != self.routing.default_language
            && language.confidence() > self.routing.language_confidence_threshold
    }

    /// Produce a route plan
    pub fn route(&self, ctx: &RouteContext<'_>) -> RoutePlan {
        let tier = self.resolve_tier(ctx.tier);
        let language_trigger = self.language_triggers(ctx.language);

        let (variant, sampling_mode, rule) = self.evaluate_rules(tier, ctx, language_trigger);

        let extended = EXTENDED_CATEGORIES.iter().any(|c| ctx.matched(c));
        let max_tokens = if extended {
            variant.extended_max_tokens()
        } else {
            variant.default_max_tokens()
        };

        let sampling = match sampling_mode {
            SamplingMode::Standard => variant.sampling(),
            SamplingMode::Reasoning => variant.reasoning(),
        };

        let prompt_variant = if ctx.matched(DOCUMENT_REQUEST) {
            format!("document_{}", ctx.domain.unwrap_or(GENERAL_DOMAIN))
        } else if ctx.matched(IMAGE_REQUEST) {
            "image".to_string()
        } else {
            "chat".to_string()
        };

        let language_context = language_trigger.then(|| LanguageContext::for_detection(ctx.language));

        let plan = RoutePlan {
            tier: tier.name().to_string(),
            provider: variant.provider().to_string(),
            model: variant.model().to_string(),
            capability: variant.capability(),
            sampling,
            sampling_mode,
            max_tokens,
            prompt_variant,
            language_context,
            escalated: rule == RouteRule::Escalated,
            rule,
            categories: ctx.categories.iter().cloned().collect(),
            fallback: tier.fallback().clone(),
        };

        tracing::debug!(
            tier = %plan.tier,
            provider = %plan.provider,
            model = %plan.model,
            rule = plan.rule.as_str(),
            escalated = plan.escalated,
            max_tokens = plan.max_tokens,
            prompt_variant = %plan.prompt_variant,
            language = %ctx.language.code(),
            "Route plan produced"
        );

        plan
    }

    /// Rule chain, first match wins
    fn evaluate_rules<'t>(
        &self,
        tier: &'t TierPolicy,
        ctx: &RouteContext<'_>,
        language_trigger: bool,
    ) -> (&'t ModelVariant, SamplingMode, RouteRule) {
        // Rule 1: unpaid tiers never escalate
        if !self.is_paid(tier) {
            return (tier.default_variant(), SamplingMode::Standard, RouteRule::Unpaid);
        }

        // Rule 2: escalation categories or a confident non-default language
        let wants_escalation =
            ESCALATION_CATEGORIES.iter().any(|c| ctx.matched(c)) || language_trigger;
        if wants_escalation && let Some(escalation) = tier.escalation_variant() {
            return (escalation, SamplingMode::Reasoning, RouteRule::Escalated);
        }

        // Rule 3: thinking mode on the default variant
        if ctx.matched(THINKING) {
            return (tier.default_variant(), SamplingMode::Reasoning, RouteRule::Thinking);
        }

        (tier.default_variant(), SamplingMode::Standard, RouteRule::Default)
    }
}
