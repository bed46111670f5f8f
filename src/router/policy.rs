//! Tier policy: model variants, sampling profiles and the built-in tier table
//!
//! Policy values are configuration. Everything here is validated once at
//! startup so the router can treat it as trusted data.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{AppError, AppResult};

/// Provider plus model identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelTarget {
    pub provider: String,
    pub model: String,
}

impl ModelTarget {
    pub fn new(provider: &str, model: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
        }
    }
}

impl std::fmt::Display for ModelTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Sampling parameters sent with a completion request
///
/// # Custom Deserialization
///
/// Deserialization goes through [`SamplingProfile::new`], so an out-of-range
/// temperature or nucleus value is rejected while the TOML is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingProfile {
    temperature: f64,
    top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_p: Option<f64>,
}

impl SamplingProfile {
    /// Create a validated sampling profile
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when temperature is outside [0, 2], top_p
    /// outside (0, 1], or min_p outside [0, 1].
    pub fn new(
        temperature: f64,
        top_p: f64,
        top_k: Option<u32>,
        min_p: Option<f64>,
    ) -> AppResult<Self> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }
        if !(top_p > 0.0 && top_p <= 1.0) {
            return Err(AppError::Config(format!(
                "top_p must be in (0.0, 1.0], got {}",
                top_p
            )));
        }
        if let Some(min_p) = min_p
            && !(0.0..=1.0).contains(&min_p)
        {
            return Err(AppError::Config(format!(
                "min_p must be between 0.0 and 1.0, got {}",
                min_p
            )));
        }
        Ok(Self {
            temperature,
            top_p,
            top_k,
            min_p,
        })
    }

    /// Conversational defaults
    pub fn standard() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: None,
            min_p: None,
        }
    }

    /// Thinking-mode defaults
    pub fn reasoning() -> Self {
        Self {
            temperature: 0.6,
            top_p: 0.95,
            top_k: Some(20),
            min_p: Some(0.0),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn top_p(&self) -> f64 {
        self.top_p
    }

    pub fn top_k(&self) -> Option<u32> {
        self.top_k
    }

    pub fn min_p(&self) -> Option<f64> {
        self.min_p
    }
}

impl<'de> Deserialize<'de> for SamplingProfile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Raw {
            temperature: f64,
            top_p: f64,
            #[serde(default)]
            top_k: Option<u32>,
            #[serde(default)]
            min_p: Option<f64>,
        }

        let raw = Raw::deserialize(deserializer)?;
        SamplingProfile::new(raw.temperature, raw.top_p, raw.top_k, raw.min_p).map_err(|e| {
            serde::de::Error::custom(format!("Invalid sampling profile: {}", e))
        })
    }
}

/// One deployable model within a tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVariant {
    provider: String,
    model: String,
    /// Relative capability; higher is stronger
    capability: u8,
    default_max_tokens: u32,
    extended_max_tokens: u32,
    #[serde(default = "SamplingProfile::standard")]
    sampling: SamplingProfile,
    #[serde(default = "SamplingProfile::reasoning")]
    reasoning: SamplingProfile,
}

impl ModelVariant {
    pub fn new(
        target: ModelTarget,
        capability: u8,
        default_max_tokens: u32,
        extended_max_tokens: u32,
    ) -> Self {
        Self {
            provider: target.provider,
            model: target.model,
            capability,
            default_max_tokens,
            extended_max_tokens,
            sampling: SamplingProfile::standard(),
            reasoning: SamplingProfile::reasoning(),
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingProfile) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_reasoning(mut self, reasoning: SamplingProfile) -> Self {
        self.reasoning = reasoning;
        self
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

    pub fn default_max_tokens(&self) -> u32 {
        self.default_max_tokens
    }

    pub fn extended_max_tokens(&self) -> u32 {
        self.extended_max_tokens
    }

    pub fn sampling(&self) -> SamplingProfile {
        self.sampling
    }

    pub fn reasoning(&self) -> SamplingProfile {
        self.reasoning
    }
}

/// A subscription tier and its models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPolicy {
    name: String,
    rank: u8,
    default: ModelVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    escalation: Option<ModelVariant>,
    fallback: ModelTarget,
}

impl TierPolicy {
    pub fn new(
        name: &str,
        rank: u8,
        default: ModelVariant,
        escalation: Option<ModelVariant>,
        fallback: ModelTarget,
    ) -> Self {
        Self {
            name: name.to_string(),
            rank,
            default,
            escalation,
            fallback,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn default_variant(&self) -> &ModelVariant {
        &self.default
    }

    pub fn escalation_variant(&self) -> Option<&ModelVariant> {
        self.escalation.as_ref()
    }

    pub fn fallback(&self) -> &ModelTarget {
        &self.fallback
    }
}

/// Check a tier table for consistency
///
/// # Errors
/// Returns [`AppError::Config`] naming the first offending tier.
pub fn validate_tiers(tiers: &[TierPolicy], paid_threshold_rank: u8) -> AppResult<()> {
    if tiers.is_empty() {
        return Err(AppError::Config(
            "at least one [[tiers]] entry is required".to_string(),
        ));
    }

    let mut names = HashSet::new();
    let mut ranks = HashSet::new();
    for tier in tiers {
        if tier.name.trim().is_empty() {
            return Err(AppError::Config("tier name cannot be empty".to_string()));
        }
        if !names.insert(tier.name.as_str()) {
            return Err(AppError::Config(format!("duplicate tier name '{}'", tier.name)));
        }
        if !ranks.insert(tier.rank) {
            return Err(AppError::Config(format!(
                "tier '{}' reuses rank {}",
                tier.name, tier.rank
            )));
        }

        for (label, variant) in std::iter::once(("default", &tier.default))
            .chain(tier.escalation.as_ref().map(|v| ("escalation", v)))
        {
            if variant.default_max_tokens == 0 {
                return Err(AppError::Config(format!(
                    "tier '{}' {} variant has default_max_tokens=0",
                    tier.name, label
                )));
            }
            if variant.extended_max_tokens < variant.default_max_tokens {
                return Err(AppError::Config(format!(
                    "tier '{}' {} variant has extended_max_tokens={} below default_max_tokens={}",
                    tier.name, label, variant.extended_max_tokens, variant.default_max_tokens
                )));
            }
            if variant.reasoning.temperature <= 0.0 {
                return Err(AppError::Config(format!(
                    "tier '{}' {} variant needs a reasoning temperature above 0",
                    tier.name, label
                )));
            }
        }

        let paid = tier.rank >= paid_threshold_rank;
        match &tier.escalation {
            None if paid => {
                return Err(AppError::Config(format!(
                    "paid tier '{}' must declare an escalation variant",
                    tier.name
                )));
            }
            Some(escalation) if escalation.capability < tier.default.capability => {
                return Err(AppError::Config(format!(
                    "tier '{}' escalation capability {} is below its default capability {}",
                    tier.name, escalation.capability, tier.default.capability
                )));
            }
            _ => {}
        }
    }

    let mut ordered: Vec<&TierPolicy> = tiers.iter().collect();
    ordered.sort_by_key(|t| t.rank);

    if ordered[0].rank >= paid_threshold_rank {
        return Err(AppError::Config(format!(
            "lowest tier '{}' (rank {}) must be below the paid threshold rank {}",
            ordered[0].name, ordered[0].rank, paid_threshold_rank
        )));
    }

    for pair in ordered.windows(2) {
        let (lower, higher) = (pair[0], pair[1]);
        if higher.default.capability < lower.default.capability {
            return Err(AppError::Config(format!(
                "tier '{}' default capability {} is below lower tier '{}' ({})",
                higher.name, higher.default.capability, lower.name, lower.default.capability
            )));
        }
        if let (Some(low), Some(high)) = (&lower.escalation, &higher.escalation)
            && high.capability < low.capability
        {
            return Err(AppError::Config(format!(
                "tier '{}' escalation capability {} is below lower tier '{}' ({})",
                higher.name, high.capability, lower.name, low.capability
            )));
        }
    }

    Ok(())
}

fn openrouter_fallback() -> ModelTarget {
    ModelTarget::new("openrouter", "meta-llama/llama-3.1-8b-instruct")
}

/// Built-in tier table used when configuration omits `[[tiers]]`
pub fn builtin_tiers() -> Vec<TierPolicy> {
    vec![
        TierPolicy::new(
            "free",
            0,
            ModelVariant::new(ModelTarget::new("groq", "llama-3.1-8b-instant"), 1, 1024, 2048),
            None,
            openrouter_fallback(),
        ),
        TierPolicy::new(
            "starter",
            1,
            ModelVariant::new(
                ModelTarget::new("groq", "llama-3.3-70b-versatile"),
                2,
                2048,
                4096,
            ),
            Some(ModelVariant::new(
                ModelTarget::new("deepinfra", "Qwen/Qwen3-235B-A22B"),
                3,
                4096,
                8192,
            )),
            openrouter_fallback(),
        ),
        TierPolicy::new(
            "pro",
            2,
            ModelVariant::new(
                ModelTarget::new("deepinfra", "Qwen/Qwen3-235B-A22B"),
                3,
                4096,
                8192,
            ),
            Some(ModelVariant::new(
                ModelTarget::new("deepseek", "deepseek-reasoner"),
                4,
                8192,
                16384,
            )),
            openrouter_fallback(),
        ),
        TierPolicy::new(
            "enterprise",
            3,
            ModelVariant::new(ModelTarget::new("deepseek", "deepseek-chat"), 4, 8192, 16384),
            Some(ModelVariant::new(
                ModelTarget::new("moonshot", "kimi-k2-thinking"),
                5,
                16384,
                32768,
            )),
            openrouter_fallback(),
        ),
    ]
}
