//! Decision pipeline
//!
//! The lexicon, category tables and tier table are built once at startup and
//! shared read-only. A request runs through an ordered list of enrichers,
//! each filling in part of an [`Enrichment`], and the tier router turns the
//! result into a [`RoutePlan`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::classify::{CategoryTable, KeywordClassifier};
use crate::config::Config;
use crate::detect::{DetectionResult, LanguageDetector};
use crate::error::{AppError, AppResult};
use crate::lexicon::LexiconStore;
use crate::lexicon::categories::{self, GENERAL_DOMAIN};
use crate::router::{RouteContext, RoutePlan, TierRouter};

pub use crate::classify::DomainMatch;

/// Which embedded category table to classify against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    #[default]
    Chat,
    Domain,
}

/// Signals gathered about one message
#[derive(Debug, Clone, Default, Serialize)]
pub struct Enrichment {
    pub language: Option<DetectionResult>,
    pub categories: BTreeSet<String>,
    pub domain: Option<DomainMatch>,
}

/// One step of the enrichment chain
pub trait TextEnricher: Send + Sync {
    fn name(&self) -> &'static str;

    fn enrich(&self, text: &str, enrichment: &mut Enrichment);
}

impl TextEnricher for LanguageDetector {
    fn name(&self) -> &'static str {
        "language"
    }

    fn enrich(&self, text: &str, enrichment: &mut Enrichment) {
        enrichment.language = Some(self.detect(text));
    }
}

/// Chat-table classification
#[derive(Debug, Clone)]
pub struct ChatIntentEnricher {
    table: Arc<CategoryTable>,
}

impl ChatIntentEnricher {
    pub fn new(table: Arc<CategoryTable>) -> Self {
        Self { table }
    }
}

impl TextEnricher for ChatIntentEnricher {
    fn name(&self) -> &'static str {
        "chat_intent"
    }

    fn enrich(&self, text: &str, enrichment: &mut Enrichment) {
        enrichment.categories = KeywordClassifier::new().classify(text, &self.table);
    }
}

/// Document-domain pick
#[derive(Debug, Clone)]
pub struct DomainEnricher {
    table: Arc<CategoryTable>,
}

impl DomainEnricher {
    pub fn new(table: Arc<CategoryTable>) -> Self {
        Self { table }
    }
}

impl TextEnricher for DomainEnricher {
    fn name(&self) -> &'static str {
        "domain"
    }

    fn enrich(&self, text: &str, enrichment: &mut Enrichment) {
        enrichment.domain = KeywordClassifier::new().best_match(text, &self.table);
    }
}

/// Full decision for one message
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub language: DetectionResult,
    pub categories: BTreeSet<String>,
    /// Best document domain, `general` when nothing matched
    pub domain: String,
    pub plan: RoutePlan,
}

/// Startup-built, read-only decision layer
pub struct DecisionEngine {
    detector: Arc<LanguageDetector>,
    chat_table: Arc<CategoryTable>,
    domain_table: Arc<CategoryTable>,
    enrichers: Vec<Arc<dyn TextEnricher>>,
    router: TierRouter,
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.enrichers.iter().map(|e| e.name()).collect();
        f.debug_struct("DecisionEngine")
            .field("enrichers", &names)
            .field("tiers", &self.router.tiers().len())
            .finish()
    }
}

impl DecisionEngine {
    /// Build the engine from configuration and the embedded tables
    ///
    /// # Errors
    /// Fails if the lexicon or a category table does not compile, the tier
    /// table is inconsistent, or the default language is not in the lexicon.
    pub fn new(config: &Config) -> AppResult<Self> {
        let lexicon = Arc::new(LexiconStore::builtin()?);
        if lexicon.profile(&config.routing.default_language).is_none() {
            return Err(AppError::Config(format!(
                "routing.default_language '{}' is not a supported language",
                config.routing.default_language
            )));
        }

        let detector = Arc::new(LanguageDetector::new(lexicon, config.detection.clone()));
        let chat_table = Arc::new(categories::chat_table()?);
        let domain_table = Arc::new(categories::domain_table()?);
        let router = TierRouter::new(config.tiers.clone(), config.routing.clone())?;

        let enrichers: Vec<Arc<dyn TextEnricher>> = vec![
            detector.clone() as Arc<dyn TextEnricher>,
            Arc::new(ChatIntentEnricher::new(chat_table.clone())) as Arc<dyn TextEnricher>,
            Arc::new(DomainEnricher::new(domain_table.clone())) as Arc<dyn TextEnricher>,
        ];

        tracing::info!(
            enrichers = enrichers.len(),
            chat_categories = chat_table.categories().len(),
            domain_categories = domain_table.categories().len(),
            tiers = router.tiers().len(),
            "Decision engine ready"
        );

        Ok(Self {
            detector,
            chat_table,
            domain_table,
            enrichers,
            router,
        })
    }

    pub fn detector(&self) -> &LanguageDetector {
        &self.detector
    }

    pub fn router(&self) -> &TierRouter {
        &self.router
    }

    pub fn table(&self, kind: TableKind) -> &CategoryTable {
        match kind {
            TableKind::Chat => &self.chat_table,
            TableKind::Domain => &self.domain_table,
        }
    }

    pub fn detect(&self, text: &str) -> DetectionResult {
        self.detector.detect(text)
    }

    pub fn classify(&self, text: &str, kind: TableKind) -> BTreeSet<String> {
        KeywordClassifier::new().classify(text, self.table(kind))
    }

    pub fn best_domain(&self, text: &str) -> Option<DomainMatch> {
        KeywordClassifier::new().best_match(text, &self.domain_table)
    }

    /// Run every enricher over `text`, in order
    pub fn enrich(&self, text: &str) -> Enrichment {
        let mut enrichment = Enrichment::default();
        for enricher in &self.enrichers {
            enricher.enrich(text, &mut enrichment);
        }
        enrichment
    }

    /// Detect, classify and route one message
    ///
    /// `tier` of `None` uses the configured default tier.
    pub fn route(&self, tier: Option<&str>, text: &str) -> Decision {
        let enrichment = self.enrich(text);
        let language = enrichment
            .language
            .unwrap_or_else(|| self.detector.fallback());
        let tier = tier.unwrap_or(&self.router.routing().default_tier);
        let domain = enrichment.domain.as_ref().map(|d| d.category.as_str());

        let ctx = RouteContext::new(tier, &language, &enrichment.categories).with_domain(domain);
        let plan = self.router.route(&ctx);

        Decision {
            domain: domain.unwrap_or(GENERAL_DOMAIN).to_string(),
            language,
            categories: enrichment.categories,
            plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DecisionEngine {
        DecisionEngine::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_enrichers_run_in_order() {
        let engine = engine();
        let names: Vec<&str> = engine.enrichers.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["language", "chat_intent", "domain"]);
    }

    #[test]
    fn test_enrich_fills_every_signal() {
        let engine = engine();
        let enrichment = engine.enrich("Please draft a business plan for my spaza shop");
        assert!(enrichment.language.is_some());
        assert!(enrichment.categories.contains("document_request"));
        assert_eq!(enrichment.domain.unwrap().category, "business");
    }

    #[test]
    fn test_route_uses_default_tier() {
        let engine = engine();
        let decision = engine.route(None, "hello how are you");
        assert_eq!(decision.plan.tier(), "free");
        assert_eq!(decision.domain, "general");
    }

    #[test]
    fn test_document_route_uses_domain_prompt() {
        let engine = engine();
        let decision = engine.route(Some("pro"), "Please draft a business plan for my spaza shop");
        assert_eq!(decision.plan.prompt_variant(), "document_business");
        assert_eq!(decision.plan.max_tokens(), 8192);
    }

    #[test]
    fn test_classify_by_table_kind() {
        let engine = engine();
        assert!(engine.classify("RICA rules", TableKind::Chat).contains("legal"));
        assert!(engine.classify("thesis citation", TableKind::Domain).contains("academic"));
    }

    #[test]
    fn test_unknown_default_language_rejected() {
        let mut config = Config::default();
        config.routing.default_language = "fr".to_string();
        assert!(DecisionEngine::new(&config).is_err());
    }
}
