//! Weighted keyword and intent classifier
//!
//! One engine, many tables. The chat table decides escalation, extended
//! output, thinking mode and image intent; the document table picks a
//! professional domain.
//!
//! Matching rules:
//! - multi-word triggers match as plain substrings
//! - single-word triggers must sit on word boundaries, so "rica" never fires
//!   inside "america"
//! - a category matches when a mandatory trigger or an intent regex matches,
//!   or when the summed weight of matched triggers exceeds its threshold

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{AppError, AppResult};

/// One weighted phrase in a category
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    phrase: String,
    weight: f64,
    mandatory: bool,
}

impl Trigger {
    /// Create a weighted trigger
    ///
    /// # Errors
    /// Returns [`AppError::Lexicon`] for an empty phrase or a weight outside (0, 1].
    pub fn new(phrase: &str, weight: f64) -> AppResult<Self> {
        let phrase = phrase.trim().to_lowercase();
        if phrase.is_empty() {
            return Err(AppError::Lexicon("trigger phrase cannot be empty".to_string()));
        }
        if !(weight > 0.0 && weight <= 1.0) {
            return Err(AppError::Lexicon(format!(
                "trigger '{}' weight must be in (0, 1], got {}",
                phrase, weight
            )));
        }
        Ok(Self {
            phrase,
            weight,
            mandatory: false,
        })
    }

    /// Create a trigger whose presence alone forces its category
    pub fn mandatory(phrase: &str) -> AppResult<Self> {
        let mut trigger = Self::new(phrase, 1.0)?;
        trigger.mandatory = true;
        Ok(trigger)
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// Whether this trigger occurs in `lowered`
    pub fn matches(&self, lowered: &str) -> bool {
        if self.phrase.chars().any(char::is_whitespace) {
            lowered.contains(self.phrase.as_str())
        } else {
            contains_word(lowered, &self.phrase)
        }
    }
}

/// Substring match that only counts occurrences bounded by non-alphanumerics
pub fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    haystack.match_indices(word).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// A named set of triggers plus optional intent patterns
#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    threshold: f64,
    triggers: Vec<Trigger>,
    intents: Vec<Regex>,
}

impl Category {
    /// Create a category
    ///
    /// # Errors
    /// Returns [`AppError::Lexicon`] for an empty name, a negative threshold or
    /// an invalid intent pattern.
    pub fn new(
        name: &str,
        threshold: f64,
        triggers: Vec<Trigger>,
        intents: &[&str],
    ) -> AppResult<Self> {
        if name.trim().is_empty() {
            return Err(AppError::Lexicon("category name cannot be empty".to_string()));
        }
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(AppError::Lexicon(format!(
                "category '{}' threshold must be a non-negative number, got {}",
                name, threshold
            )));
        }
        let intents = intents
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    AppError::Lexicon(format!(
                        "invalid intent pattern '{}' for category '{}': {}",
                        p, name, e
                    ))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            threshold,
            triggers,
            intents,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Evaluate this category against lowercase text
    pub fn evaluate(&self, lowered: &str) -> CategoryScore {
        let mut score = 0.0;
        let mut forced = false;
        for trigger in self.triggers.iter().filter(|t| t.matches(lowered)) {
            score += trigger.weight();
            forced |= trigger.is_mandatory();
        }
        if !forced {
            forced = self.intents.iter().any(|re| re.is_match(lowered));
        }

        CategoryScore {
            category: self.name.clone(),
            score,
            matched: forced || score > self.threshold,
        }
    }
}

/// Per-category evaluation result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: String,
    /// Sum of matched trigger weights
    pub score: f64,
    pub matched: bool,
}

/// Best domain pick from [`KeywordClassifier::best_match`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainMatch {
    pub category: String,
    pub score: f64,
}

/// An ordered, named table of disjoint categories
#[derive(Debug, Clone)]
pub struct CategoryTable {
    name: String,
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Create a table; category names must be unique
    pub fn new(name: &str, categories: Vec<Category>) -> AppResult<Self> {
        let mut seen = BTreeSet::new();
        for category in &categories {
            if !seen.insert(category.name()) {
                return Err(AppError::Lexicon(format!(
                    "duplicate category '{}' in table '{}'",
                    category.name(),
                    name
                )));
            }
        }
        Ok(Self {
            name: name.to_string(),
            categories,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Categories in declaration order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name() == name)
    }
}

/// Stateless classifier over any [`CategoryTable`]
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Every category whose match condition holds
    pub fn classify(&self, text: &str, table: &CategoryTable) -> BTreeSet<String> {
        let matched: BTreeSet<String> = self
            .scores(text, table)
            .into_iter()
            .filter(|s| s.matched)
            .map(|s| s.category)
            .collect();

        tracing::debug!(
            table = %table.name(),
            matched = ?matched,
            "Keyword classification complete"
        );

        matched
    }

    /// Scores for every category, in declaration order
    pub fn scores(&self, text: &str, table: &CategoryTable) -> Vec<CategoryScore> {
        let lowered = text.to_lowercase();
        table
            .categories()
            .iter()
            .map(|category| category.evaluate(&lowered))
            .collect()
    }

    /// Category with the highest accumulated weight
    ///
    /// Returns `None` if no trigger matched anywhere. Ties go to the category
    /// declared first.
    pub fn best_match(&self, text: &str, table: &CategoryTable) -> Option<DomainMatch> {
        let mut best: Option<CategoryScore> = None;
        for score in self.scores(text, table) {
            if score.score <= 0.0 {
                continue;
            }
            if best.as_ref().is_none_or(|b| score.score > b.score) {
                best = Some(score);
            }
        }
        best.map(|s| DomainMatch {
            category: s.category,
            score: s.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CategoryTable {
        CategoryTable::new(
            "test",
            vec![
                Category::new(
                    "legal",
                    0.5,
                    vec![
                        Trigger::new("contract", 0.4).unwrap(),
                        Trigger::new("court", 0.3).unwrap(),
                        Trigger::mandatory("rica").unwrap(),
                    ],
                    &[],
                )
                .unwrap(),
                Category::new(
                    "image",
                    0.9,
                    vec![Trigger::new("picture", 0.3).unwrap()],
                    &[r"\b(?:draw|paint)\b.{0,20}\bpicture\b"],
                )
                .unwrap(),
                Category::new(
                    "business",
                    0.5,
                    vec![
                        Trigger::new("contract", 0.4).unwrap(),
                        Trigger::new("business plan", 0.7).unwrap(),
                    ],
                    &[],
                )
                .unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_single_word_trigger_respects_word_boundaries() {
        let trigger = Trigger::new("rica", 1.0).unwrap();
        assert!(!trigger.matches("flights to south america"));
        assert!(trigger.matches("what does rica require?"));
        assert!(trigger.matches("rica"));
    }

    #[test]
    fn test_multi_word_trigger_matches_as_substring() {
        let trigger = Trigger::new("business plan", 0.7).unwrap();
        assert!(trigger.matches("my business plans for 2025"));
    }

    #[test]
    fn test_contains_word_unicode_boundaries() {
        assert!(contains_word("umthetho, please", "umthetho"));
        assert!(!contains_word("ngomthetho", "umthetho"));
        assert!(!contains_word("déjàvu", "vu"));
        assert!(contains_word("x-vu-y", "vu"));
    }

    #[test]
    fn test_trigger_weight_validation() {
        assert!(Trigger::new("x", 0.0).is_err());
        assert!(Trigger::new("x", 1.5).is_err());
        assert!(Trigger::new("  ", 0.5).is_err());
        assert!(Trigger::new("x", 1.0).is_ok());
    }

    #[test]
    fn test_trigger_phrase_is_lowercased() {
        let trigger = Trigger::new("POPIA", 0.5).unwrap();
        assert_eq!(trigger.phrase(), "popia");
        assert!(trigger.matches("is this popia compliant"));
    }

    #[test]
    fn test_threshold_must_be_exceeded() {
        let classifier = KeywordClassifier::new();
        // 0.4 + 0.3 > 0.5
        assert!(classifier.classify("contract dispute in court", &table()).contains("legal"));
        // 0.4 alone does not exceed 0.5
        assert!(!classifier.classify("a contract", &table()).contains("legal"));
    }

    #[test]
    fn test_mandatory_trigger_forces_match() {
        let classifier = KeywordClassifier::new();
        let matched = classifier.classify("RICA registration", &table());
        assert!(matched.contains("legal"));
    }

    #[test]
    fn test_intent_pattern_forces_match() {
        let classifier = KeywordClassifier::new();
        let matched = classifier.classify("please draw me a picture of a lion", &table());
        assert!(matched.contains("image"));
        let matched = classifier.classify("a picture", &table());
        assert!(!matched.contains("image"));
    }

    #[test]
    fn test_message_can_match_several_categories() {
        let classifier = KeywordClassifier::new();
        let matched = classifier.classify("the business plan contract went to court", &table());
        assert!(matched.contains("legal"));
        assert!(matched.contains("business"));
    }

    #[test]
    fn test_no_match_is_empty() {
        let classifier = KeywordClassifier::new();
        assert!(classifier.classify("hello how are you", &table()).is_empty());
        assert!(classifier.classify("", &table()).is_empty());
    }

    #[test]
    fn test_best_match_argmax() {
        let classifier = KeywordClassifier::new();
        let best = classifier
            .best_match("business plan and contract", &table())
            .unwrap();
        assert_eq!(best.category, "business");
        assert!((best.score - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_best_match_tie_prefers_first_declared() {
        let classifier = KeywordClassifier::new();
        // "contract" scores 0.4 for both legal and business
        let best = classifier.best_match("contract", &table()).unwrap();
        assert_eq!(best.category, "legal");
    }

    #[test]
    fn test_best_match_none_without_hits() {
        let classifier = KeywordClassifier::new();
        assert_eq!(classifier.best_match("hello", &table()), None);
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let make = || Category::new("a", 0.5, vec![], &[]).unwrap();
        assert!(CategoryTable::new("t", vec![make(), make()]).is_err());
    }

    #[test]
    fn test_invalid_intent_pattern_rejected() {
        assert!(Category::new("a", 0.5, vec![], &["(oops"]).is_err());
    }
}
