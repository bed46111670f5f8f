//! Configuration management for tolkroute
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section except `[server]` has defaults, including the tier table.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use crate::router::{TierPolicy, builtin_tiers, policy};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default = "builtin_tiers")]
    pub tiers: Vec<TierPolicy>,
    #[serde(default)]
    pub invoker: InvokerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            detection: DetectionConfig::default(),
            routing: RoutingConfig::default(),
            tiers: builtin_tiers(),
            invoker: InvokerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Language detector weights and scoring constants
///
/// The four stage weights combine per-language stage scores into a total;
/// the remaining values shape each stage's score curve.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub vocabulary_weight: f64,
    pub morphology_weight: f64,
    pub ngram_weight: f64,
    pub cultural_weight: f64,
    /// Vocabulary score floor once any entry matches
    pub vocabulary_base: f64,
    /// Vocabulary score added per hit
    pub vocabulary_step: f64,
    /// Credit for a vocabulary entry found inside a longer token
    pub substring_factor: f64,
    pub min_substring_len: usize,
    pub morphology_per_hit: f64,
    pub morphology_cap: f64,
    /// Shortest normalised text that gets an n-gram score
    pub ngram_min_len: usize,
    pub cultural_per_marker: f64,
    pub distinctive_confidence: f64,
    pub fallback_confidence: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            vocabulary_weight: 0.5,
            morphology_weight: 0.3,
            ngram_weight: 0.15,
            cultural_weight: 0.05,
            vocabulary_base: 0.5,
            vocabulary_step: 0.2,
            substring_factor: 0.5,
            min_substring_len: 4,
            morphology_per_hit: 0.1,
            morphology_cap: 0.4,
            ngram_min_len: 4,
            cultural_per_marker: 0.2,
            distinctive_confidence: 0.95,
            fallback_confidence: 0.15,
        }
    }
}

impl DetectionConfig {
    fn validate(&self) -> AppResult<()> {
        let unit = [
            ("vocabulary_weight", self.vocabulary_weight),
            ("morphology_weight", self.morphology_weight),
            ("ngram_weight", self.ngram_weight),
            ("cultural_weight", self.cultural_weight),
            ("vocabulary_base", self.vocabulary_base),
            ("vocabulary_step", self.vocabulary_step),
            ("substring_factor", self.substring_factor),
            ("morphology_per_hit", self.morphology_per_hit),
            ("morphology_cap", self.morphology_cap),
            ("cultural_per_marker", self.cultural_per_marker),
            ("distinctive_confidence", self.distinctive_confidence),
            ("fallback_confidence", self.fallback_confidence),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::Config(format!(
                    "detection.{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        let weight_sum =
            self.vocabulary_weight + self.morphology_weight + self.ngram_weight + self.cultural_weight;
        if weight_sum <= 0.0 {
            return Err(AppError::Config(
                "detection stage weights cannot all be zero".to_string(),
            ));
        }

        if self.min_substring_len == 0 {
            return Err(AppError::Config(
                "detection.min_substring_len must be at least 1".to_string(),
            ));
        }
        if self.ngram_min_len < 3 {
            return Err(AppError::Config(format!(
                "detection.ngram_min_len must be at least 3 (trigram width), got {}",
                self.ngram_min_len
            )));
        }
        Ok(())
    }
}

/// Tier routing policy knobs
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Tier used when a request does not name one
    pub default_tier: String,
    /// Tiers at or above this rank are paid
    pub paid_threshold_rank: u8,
    pub default_language: String,
    /// Confidence a non-default language must exceed to escalate
    pub language_confidence_threshold: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_tier: "free".to_string(),
            paid_threshold_rank: 1,
            default_language: "en".to_string(),
            language_confidence_threshold: 0.35,
        }
    }
}

/// Retry, fallback and circuit-breaker policy for backend invocation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InvokerConfig {
    /// Attempts against the primary target before substituting the fallback
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    /// Consecutive failures that open a provider's circuit
    pub circuit_failure_threshold: u32,
    /// Cool-down before an open circuit lets one trial call through
    pub circuit_reset_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff_ms: 100,
            circuit_failure_threshold: 3,
            circuit_reset_seconds: 30,
            request_timeout_seconds: 30,
        }
    }
}

impl InvokerConfig {
    fn validate(&self) -> AppResult<()> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(AppError::Config(format!(
                "invoker.max_attempts must be between 1 and 10, got {}",
                self.max_attempts
            )));
        }
        if self.retry_backoff_ms > crate::invoker::MAX_BACKOFF_MS {
            return Err(AppError::Config(format!(
                "invoker.retry_backoff_ms cannot exceed {} ms, got {}",
                crate::invoker::MAX_BACKOFF_MS,
                self.retry_backoff_ms
            )));
        }
        if self.circuit_failure_threshold == 0 {
            return Err(AppError::Config(
                "invoker.circuit_failure_threshold must be greater than 0".to_string(),
            ));
        }
        if self.circuit_reset_seconds == 0 || self.circuit_reset_seconds > 3600 {
            return Err(AppError::Config(format!(
                "invoker.circuit_reset_seconds must be in (0, 3600], got {}",
                self.circuit_reset_seconds
            )));
        }
        if self.request_timeout_seconds == 0 || self.request_timeout_seconds > 300 {
            return Err(AppError::Config(format!(
                "invoker.request_timeout_seconds must be in (0, 300], got {}",
                self.request_timeout_seconds
            )));
        }
        Ok(())
    }
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        // Phase 1: read (keeps the io::Error)
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            })?;

        // Phase 2: parse (keeps the toml::de::Error)
        let config: Self = toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
            path: path_display.clone(),
            source,
        })?;

        // Phase 3: validate
        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Validate configuration after parsing
    ///
    /// Called by `from_file()` and `from_str()`. Call it explicitly when a
    /// `Config` is assembled by hand.
    pub fn validate(&self) -> AppResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(AppError::Config("server.host cannot be empty".to_string()));
        }

        self.detection.validate()?;

        policy::validate_tiers(&self.tiers, self.routing.paid_threshold_rank)?;

        if !self.tiers.iter().any(|t| t.name() == self.routing.default_tier) {
            let known: Vec<&str> = self.tiers.iter().map(|t| t.name()).collect();
            return Err(AppError::Config(format!(
                "routing.default_tier '{}' is not a configured tier (known: {})",
                self.routing.default_tier,
                known.join(", ")
            )));
        }

        if self.routing.default_language.trim().is_empty() {
            return Err(AppError::Config(
                "routing.default_language cannot be empty".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.routing.language_confidence_threshold) {
            return Err(AppError::Config(format!(
                "routing.language_confidence_threshold must be between 0.0 and 1.0, got {}",
                self.routing.language_confidence_threshold
            )));
        }

        self.invoker.validate()?;

        if !LOG_LEVELS.contains(&self.observability.log_level.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "observability.log_level '{}' is not one of: {}",
                self.observability.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Tier used when a request does not name one
    pub fn default_tier(&self) -> &str {
        &self.routing.default_tier
    }
}

impl FromStr for Config {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 3000
"#;

    const FULL_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 8080

[detection]
vocabulary_weight = 0.6
morphology_weight = 0.2

[routing]
default_tier = "basic"
paid_threshold_rank = 1
default_language = "en"
language_confidence_threshold = 0.4

[[tiers]]
name = "basic"
rank = 0

[tiers.default]
provider = "groq"
model = "llama-3.1-8b-instant"
capability = 1
default_max_tokens = 512
extended_max_tokens = 1024

[tiers.fallback]
provider = "openrouter"
model = "meta-llama/llama-3.1-8b-instruct"

[[tiers]]
name = "premium"
rank = 1

[tiers.default]
provider = "deepinfra"
model = "Qwen/Qwen3-235B-A22B"
capability = 3
default_max_tokens = 4096
extended_max_tokens = 8192

[tiers.default.sampling]
temperature = 0.5
top_p = 0.9

[tiers.escalation]
provider = "deepseek"
model = "deepseek-reasoner"
capability = 4
default_max_tokens = 8192
extended_max_tokens = 16384

[tiers.escalation.reasoning]
temperature = 0.6
top_p = 0.95
top_k = 20
min_p = 0.0

[tiers.fallback]
provider = "openrouter"
model = "meta-llama/llama-3.1-8b-instruct"

[invoker]
max_attempts = 2
retry_backoff_ms = 50

[observability]
log_level = "debug"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = MINIMAL_CONFIG.parse().expect("should parse minimal config");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.detection, DetectionConfig::default());
        assert_eq!(config.routing, RoutingConfig::default());
        assert_eq!(config.invoker, InvokerConfig::default());
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.tiers.len(), 4);
        assert_eq!(config.default_tier(), "free");
    }

    #[test]
    fn test_full_config_parses() {
        let config: Config = FULL_CONFIG.parse().expect("should parse full config");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.detection.vocabulary_weight, 0.6);
        // Unset detection fields keep their defaults
        assert_eq!(config.detection.ngram_weight, 0.15);
        assert_eq!(config.routing.language_confidence_threshold, 0.4);
        assert_eq!(config.tiers.len(), 2);
        assert_eq!(config.tiers[1].default_variant().sampling().temperature(), 0.5);
        let escalation = config.tiers[1].escalation_variant().unwrap();
        assert_eq!(escalation.reasoning().top_k(), Some(20));
        assert_eq!(config.invoker.max_attempts, 2);
        assert_eq!(config.invoker.circuit_failure_threshold, 3);
    }

    #[test]
    fn test_missing_server_section_fails() {
        let result = "[routing]\ndefault_tier = \"free\"".parse::<Config>();
        assert!(matches!(result, Err(AppError::ConfigParseFailed { .. })));
    }

    #[test]
    fn test_unknown_default_tier_rejected() {
        let toml = format!("{}\n[routing]\ndefault_tier = \"gold\"\n", MINIMAL_CONFIG);
        let err = toml.parse::<Config>().unwrap_err();
        assert!(err.to_string().contains("gold"));
    }

    #[test]
    fn test_detection_weights_validated() {
        let toml = format!("{}\n[detection]\nvocabulary_weight = 1.5\n", MINIMAL_CONFIG);
        assert!(toml.parse::<Config>().is_err());

        let toml = format!(
            "{}\n[detection]\nvocabulary_weight = 0.0\nmorphology_weight = 0.0\nngram_weight = 0.0\ncultural_weight = 0.0\n",
            MINIMAL_CONFIG
        );
        let err = toml.parse::<Config>().unwrap_err();
        assert!(err.to_string().contains("zero"));
    }

    #[test]
    fn test_ngram_min_len_must_cover_trigram() {
        let toml = format!("{}\n[detection]\nngram_min_len = 2\n", MINIMAL_CONFIG);
        assert!(toml.parse::<Config>().is_err());
    }

    #[test]
    fn test_language_threshold_range() {
        let toml = format!(
            "{}\n[routing]\nlanguage_confidence_threshold = 1.2\n",
            MINIMAL_CONFIG
        );
        assert!(toml.parse::<Config>().is_err());
    }

    #[test]
    fn test_invoker_limits() {
        for section in [
            "[invoker]\nmax_attempts = 0\n",
            "[invoker]\nmax_attempts = 11\n",
            "[invoker]\ncircuit_failure_threshold = 0\n",
            "[invoker]\nretry_backoff_ms = 60000\n",
            "[invoker]\nrequest_timeout_seconds = 0\n",
            "[invoker]\ncircuit_reset_seconds = 0\n",
            "[invoker]\ncircuit_reset_seconds = 7200\n",
        ] {
            let toml = format!("{}\n{}", MINIMAL_CONFIG, section);
            assert!(toml.parse::<Config>().is_err(), "should reject: {}", section);
        }
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let toml = format!("{}\n[observability]\nlog_level = \"loud\"\n", MINIMAL_CONFIG);
        assert!(toml.parse::<Config>().is_err());
    }

    #[test]
    fn test_sampling_profile_rejected_at_parse_time() {
        let toml = FULL_CONFIG.replace("temperature = 0.5", "temperature = 5.0");
        let result = toml.parse::<Config>();
        assert!(matches!(result, Err(AppError::ConfigParseFailed { .. })));
    }

    #[test]
    fn test_paid_tier_without_escalation_rejected() {
        let toml = FULL_CONFIG.replace("[tiers.escalation]", "[tiers.unused]");
        let result = toml.parse::<Config>();
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().expect("default config should be valid");
    }
}
