//! Command-line interface for tolkroute
//!
//! Provides argument parsing and subcommand handling for the tolkroute binary.

use clap::{Parser, Subcommand};

/// Language-aware tier router for multilingual chat
#[derive(Parser)]
#[command(name = "tolkroute")]
#[command(version)]
#[command(about = "Language-aware tier router for multilingual chat")]
#[command(
    long_about = "tolkroute detects which of South Africa's eleven official languages a \
    message is written in, classifies its intent, and decides which model a subscription \
    tier should use to answer it."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Detect the language of a message and print the result as JSON
    Detect {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Produce a route plan for a message and print it as JSON
    Route {
        /// Subscription tier (defaults to routing.default_tier)
        #[arg(short, long)]
        tier: Option<String>,

        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

/// Join positional words back into one message
pub fn join_text(words: &[String]) -> String {
    words.join(" ")
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# tolkroute configuration
# =======================
#
# Only [server] is required. Every other section falls back to the values
# shown here.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"
port = 3000

# ─────────────────────────────────────────────────────────────────────────────
# LANGUAGE DETECTION
# ─────────────────────────────────────────────────────────────────────────────
#
# Stage weights combine the four per-language scores into a confidence.

[detection]
vocabulary_weight = 0.5
morphology_weight = 0.3
ngram_weight = 0.15
cultural_weight = 0.05

# Vocabulary score: vocabulary_base + hits * vocabulary_step, capped at 1.0
vocabulary_base = 0.5
vocabulary_step = 0.2
# Entries found inside a longer word count at this factor (entries of at least min_substring_len chars)
substring_factor = 0.5
min_substring_len = 4

morphology_per_hit = 0.1
morphology_cap = 0.4
# Texts shorter than this (after normalisation) get no trigram score
ngram_min_len = 4
cultural_per_marker = 0.2

distinctive_confidence = 0.95
fallback_confidence = 0.15

# ─────────────────────────────────────────────────────────────────────────────
# ROUTING
# ─────────────────────────────────────────────────────────────────────────────

[routing]
# Tier used when a request does not name one
default_tier = "free"
# Tiers with rank >= this value are paid and may escalate
paid_threshold_rank = 1
default_language = "en"
# A non-default language must exceed this confidence to escalate or get a language block
language_confidence_threshold = 0.35

# ─────────────────────────────────────────────────────────────────────────────
# TIERS
# ─────────────────────────────────────────────────────────────────────────────
#
# Variant fields:
#   - provider / model: backend identifiers passed to the invoker
#   - capability: relative strength, must not decrease with rank
#   - default_max_tokens / extended_max_tokens: token ceilings
#   - [*.sampling] / [*.reasoning]: optional sampling profiles

[[tiers]]
name = "free"
rank = 0

[tiers.default]
provider = "groq"
model = "llama-3.1-8b-instant"
capability = 1
default_max_tokens = 1024
extended_max_tokens = 2048

[tiers.fallback]
provider = "openrouter"
model = "meta-llama/llama-3.1-8b-instruct"

[[tiers]]
name = "starter"
rank = 1

[tiers.default]
provider = "groq"
model = "llama-3.3-70b-versatile"
capability = 2
default_max_tokens = 2048
extended_max_tokens = 4096

[tiers.escalation]
provider = "deepinfra"
model = "Qwen/Qwen3-235B-A22B"
capability = 3
default_max_tokens = 4096
extended_max_tokens = 8192

[tiers.fallback]
provider = "openrouter"
model = "meta-llama/llama-3.1-8b-instruct"

[[tiers]]
name = "pro"
rank = 2

[tiers.default]
provider = "deepinfra"
model = "Qwen/Qwen3-235B-A22B"
capability = 3
default_max_tokens = 4096
extended_max_tokens = 8192

[tiers.escalation]
provider = "deepseek"
model = "deepseek-reasoner"
capability = 4
default_max_tokens = 8192
extended_max_tokens = 16384

[tiers.fallback]
provider = "openrouter"
model = "meta-llama/llama-3.1-8b-instruct"

[[tiers]]
name = "enterprise"
rank = 3

[tiers.default]
provider = "deepseek"
model = "deepseek-chat"
capability = 4
default_max_tokens = 8192
extended_max_tokens = 16384

[tiers.escalation]
provider = "moonshot"
model = "kimi-k2-thinking"
capability = 5
default_max_tokens = 16384
extended_max_tokens = 32768

[tiers.escalation.reasoning]
temperature = 0.6
top_p = 0.95
top_k = 20
min_p = 0.0

[tiers.fallback]
provider = "openrouter"
model = "meta-llama/llama-3.1-8b-instruct"

# ─────────────────────────────────────────────────────────────────────────────
# BACKEND INVOCATION
# ─────────────────────────────────────────────────────────────────────────────

[invoker]
# Attempts against the primary model before substituting the tier fallback
max_attempts = 3
# Backoff doubles each retry, capped at 30 s
retry_backoff_ms = 100
# Consecutive failures that open a provider's circuit
circuit_failure_threshold = 3
# Seconds an open circuit waits before letting one trial call through
circuit_reset_seconds = 30
request_timeout_seconds = 30

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error" (RUST_LOG overrides)
log_level = "info"

# Prometheus metrics are always available at /metrics on the server port
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::router::builtin_tiers;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_config_path() {
        let cli = Cli::parse_from(["tolkroute"]);
        assert_eq!(cli.config, "config.toml");
        assert!(cli.command.is_none());
    }

    #[test]
    fn custom_config_path() {
        let cli = Cli::parse_from(["tolkroute", "--config", "custom.toml"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn serve_subcommand() {
        let cli = Cli::parse_from(["tolkroute", "serve"]);
        assert!(matches!(cli.command, Some(Command::Serve)));
    }

    #[test]
    fn config_subcommand_with_output() {
        let cli = Cli::parse_from(["tolkroute", "config", "-o", "my-config.toml"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config { output: Some(ref path) }) if path == "my-config.toml"
        ));
    }

    #[test]
    fn detect_subcommand_joins_words() {
        let cli = Cli::parse_from(["tolkroute", "detect", "Sawubona", "baba"]);
        match cli.command {
            Some(Command::Detect { text }) => assert_eq!(join_text(&text), "Sawubona baba"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn route_subcommand_with_tier() {
        let cli = Cli::parse_from(["tolkroute", "route", "--tier", "pro", "hello there"]);
        match cli.command {
            Some(Command::Route { tier, text }) => {
                assert_eq!(tier.as_deref(), Some("pro"));
                assert_eq!(join_text(&text), "hello there");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn detect_requires_text() {
        assert!(Cli::try_parse_from(["tolkroute", "detect"]).is_err());
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["tolkroute", "detect", "--config", "x.toml", "molo"]);
        assert_eq!(cli.config, "x.toml");
    }

    #[test]
    fn template_is_valid_config() {
        let config: Config = generate_config_template()
            .parse()
            .expect("template should parse and validate");
        assert_eq!(config.tiers, builtin_tiers());
        assert_eq!(config.routing, crate::config::RoutingConfig::default());
        assert_eq!(config.detection, crate::config::DetectionConfig::default());
        assert_eq!(config.invoker, crate::config::InvokerConfig::default());
    }

    #[test]
    fn template_has_all_sections() {
        let template = generate_config_template();
        for section in [
            "[server]",
            "[detection]",
            "[routing]",
            "[[tiers]]",
            "[invoker]",
            "[observability]",
        ] {
            assert!(template.contains(section), "missing {}", section);
        }
    }
}
