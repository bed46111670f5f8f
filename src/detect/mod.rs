//! Multi-stage language detection
//!
//! `detect` is total: any input, including empty or non-linguistic text,
//! yields a [`DetectionResult`]. The pipeline is:
//!
//! 1. Distinctive-character shortcut (confidence 0.95)
//! 2. Weighted scoring over four stages: vocabulary, morphology, trigram
//!    fingerprints and cultural markers
//! 3. `argmax` over the summed scores, ties resolved by lexicon order
//! 4. English fallback when nothing scores

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashSet;
use std::sync::Arc;

use crate::classify::contains_word;
use crate::config::DetectionConfig;
use crate::lexicon::{LanguageFamily, LanguageProfile, LexiconStore};

/// Lower bound (exclusive) of the hybrid confidence band
pub const HYBRID_LOWER: f64 = 0.35;
/// Upper bound (exclusive) of the hybrid confidence band
pub const HYBRID_UPPER: f64 = 0.75;

/// Which stage decided (or dominated) a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    DistinctiveFeature,
    Vocabulary,
    Morphology,
    Ngram,
    Cultural,
    Fallback,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DistinctiveFeature => "distinctive_feature",
            Self::Vocabulary => "vocabulary",
            Self::Morphology => "morphology",
            Self::Ngram => "ngram",
            Self::Cultural => "cultural",
            Self::Fallback => "fallback",
        }
    }
}

/// Outcome of language detection for one message
///
/// `is_hybrid` is not stored. It is derived from `confidence` every time it
/// is read, so it can never disagree with the hybrid band.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    code: String,
    name: String,
    confidence: f64,
    family: LanguageFamily,
    method: DetectionMethod,
}

impl DetectionResult {
    /// Build a result for `profile`, clamping confidence into [0, 1]
    pub fn new(profile: &LanguageProfile, confidence: f64, method: DetectionMethod) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            code: profile.code().to_string(),
            name: profile.name().to_string(),
            confidence,
            family: profile.family(),
            method,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn family(&self) -> LanguageFamily {
        self.family
    }

    pub fn method(&self) -> DetectionMethod {
        self.method
    }

    /// True iff confidence lies strictly inside the hybrid band
    pub fn is_hybrid(&self) -> bool {
        self.confidence > HYBRID_LOWER && self.confidence < HYBRID_UPPER
    }
}

impl Serialize for DetectionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DetectionResult", 6)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("confidence", &self.confidence)?;
        state.serialize_field("family", &self.family)?;
        state.serialize_field("is_hybrid", &self.is_hybrid())?;
        state.serialize_field("method", &self.method)?;
        state.end()
    }
}

/// Per-language raw stage scores (before stage weighting)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageScores {
    pub vocabulary: f64,
    pub morphology: f64,
    pub ngram: f64,
    pub cultural: f64,
}

impl StageScores {
    fn weighted(&self, config: &DetectionConfig) -> [f64; 4] {
        [
            self.vocabulary * config.vocabulary_weight,
            self.morphology * config.morphology_weight,
            self.ngram * config.ngram_weight,
            self.cultural * config.cultural_weight,
        ]
    }

    /// Weighted sum of all four stages
    pub fn total(&self, config: &DetectionConfig) -> f64 {
        self.weighted(config).iter().sum()
    }

    /// Stage contributing the largest weighted share
    ///
    /// Ties go to the earlier stage in vocabulary → morphology → n-gram →
    /// cultural order.
    pub fn dominant(&self, config: &DetectionConfig) -> DetectionMethod {
        const ORDER: [DetectionMethod; 4] = [
            DetectionMethod::Vocabulary,
            DetectionMethod::Morphology,
            DetectionMethod::Ngram,
            DetectionMethod::Cultural,
        ];
        let weighted = self.weighted(config);
        let mut best = 0;
        for (idx, value) in weighted.iter().enumerate().skip(1) {
            if *value > weighted[best] {
                best = idx;
            }
        }
        ORDER[best]
    }
}

/// Language detector over a shared, immutable lexicon
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    lexicon: Arc<LexiconStore>,
    config: DetectionConfig,
}

impl LanguageDetector {
    pub fn new(lexicon: Arc<LexiconStore>, config: DetectionConfig) -> Self {
        Self { lexicon, config }
    }

    pub fn lexicon(&self) -> &LexiconStore {
        &self.lexicon
    }

    /// Detect the language of `text`
    pub fn detect(&self, text: &str) -> DetectionResult {
        if let Some(profile) = self.distinctive_match(text) {
            let result = DetectionResult::new(
                profile,
                self.config.distinctive_confidence,
                DetectionMethod::DistinctiveFeature,
            );
            tracing::debug!(
                language = %result.code(),
                confidence = result.confidence(),
                "Language detected from distinctive characters"
            );
            return result;
        }

        let lowered = text.to_lowercase();
        let scores = self.stage_scores(&lowered);

        let mut winner: Option<(usize, f64)> = None;
        for (idx, stage) in scores.iter().enumerate() {
            let total = stage.total(&self.config);
            if total <= 0.0 {
                continue;
            }
            // strict comparison keeps the earlier language on ties
            if winner.is_none_or(|(_, best)| total > best) {
                winner = Some((idx, total));
            }
        }

        let Some((idx, total)) = winner else {
            return self.fallback();
        };

        let profile = &self.lexicon.profiles()[idx];
        let method = scores[idx].dominant(&self.config);
        let result = DetectionResult::new(profile, total.min(1.0), method);

        tracing::debug!(
            language = %result.code(),
            confidence = result.confidence(),
            method = %method.as_str(),
            is_hybrid = result.is_hybrid(),
            "Language detected"
        );

        result
    }

    /// The result returned when nothing matched
    pub fn fallback(&self) -> DetectionResult {
        DetectionResult::new(
            self.lexicon.fallback_profile(),
            self.config.fallback_confidence,
            DetectionMethod::Fallback,
        )
    }

    /// Raw per-stage scores for every language, in lexicon order
    ///
    /// `lowered` must already be lowercase.
    pub fn stage_scores(&self, lowered: &str) -> Vec<StageScores> {
        let profiles = self.lexicon.profiles();
        let mut scores = vec![StageScores::default(); profiles.len()];

        let tokens = tokenize(lowered);
        for (idx, profile) in profiles.iter().enumerate() {
            scores[idx].vocabulary = self.vocabulary_score(lowered, &tokens, profile);
            scores[idx].cultural = self.cultural_score(lowered, profile);
        }

        for rule in self.lexicon.morphology() {
            let hits = rule.count_hits(lowered);
            if hits == 0 {
                continue;
            }
            let family_score = (hits as f64 * self.config.morphology_per_hit)
                .min(self.config.morphology_cap);
            for (code, damping) in rule.members() {
                if let Some(idx) = self.lexicon.index_of(code) {
                    scores[idx].morphology += family_score * damping;
                }
            }
        }

        let normalized = normalize_for_ngrams(lowered);
        if normalized.chars().count() >= self.config.ngram_min_len {
            let windows = trigrams(&normalized);
            if !windows.is_empty() {
                let total = windows.len() as f64;
                for (idx, profile) in profiles.iter().enumerate() {
                    let matches = windows.iter().filter(|w| profile.has_fingerprint(w)).count();
                    scores[idx].ngram = matches as f64 / total;
                }
            }
        }

        scores
    }

    fn distinctive_match(&self, text: &str) -> Option<&LanguageProfile> {
        let lowered = text.to_lowercase();
        self.lexicon.profiles().iter().find(|profile| {
            !profile.distinctive_chars().is_empty()
                && lowered.chars().any(|c| profile.distinctive_chars().contains(&c))
        })
    }

    fn vocabulary_score(
        &self,
        lowered: &str,
        tokens: &HashSet<&str>,
        profile: &LanguageProfile,
    ) -> f64 {
        let mut count = 0.0;
        for word in profile.vocabulary() {
            if tokens.contains(word.as_str()) {
                count += 1.0;
            } else if word.chars().count() >= self.config.min_substring_len
                && lowered.contains(word.as_str())
            {
                count += self.config.substring_factor;
            }
        }

        if count == 0.0 {
            return 0.0;
        }
        (self.config.vocabulary_base + count * self.config.vocabulary_step).min(1.0)
    }

    /// Single-word markers must stand alone; phrases match anywhere
    fn cultural_score(&self, lowered: &str, profile: &LanguageProfile) -> f64 {
        let found = profile
            .cultural_markers()
            .iter()
            .filter(|marker| {
                if marker.chars().any(char::is_whitespace) {
                    lowered.contains(marker.as_str())
                } else {
                    contains_word(lowered, marker)
                }
            })
            .count();
        found as f64 * self.config.cultural_per_marker
    }
}

/// Split lowercase text into word tokens
///
/// Anything that is neither alphanumeric nor an apostrophe separates tokens.
pub fn tokenize(lowered: &str) -> HashSet<&str> {
    lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Letters only, single spaces, trimmed
fn normalize_for_ngrams(lowered: &str) -> String {
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for c in lowered.chars() {
        if c.is_alphabetic() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Overlapping three-character windows
fn trigrams(normalized: &str) -> Vec<String> {
    let chars: Vec<char> = normalized.chars().collect();
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> LanguageDetector {
        let lexicon = Arc::new(LexiconStore::builtin().expect("lexicon should load"));
        LanguageDetector::new(lexicon, DetectionConfig::default())
    }

    #[test]
    fn test_empty_text_falls_back_to_english() {
        let result = detector().detect("");
        assert_eq!(result.code(), "en");
        assert_eq!(result.method(), DetectionMethod::Fallback);
        assert!(result.confidence() < 0.2);
        assert!(!result.is_hybrid());
    }

    #[test]
    fn test_whitespace_falls_back_to_english() {
        let result = detector().detect("   \n\t ");
        assert_eq!(result.code(), "en");
        assert_eq!(result.method(), DetectionMethod::Fallback);
    }

    #[test]
    fn test_digits_and_symbols_fall_back() {
        let result = detector().detect("12345 !!! ??? 42");
        assert_eq!(result.method(), DetectionMethod::Fallback);
    }

    #[test]
    fn test_venda_distinctive_character_short_circuits() {
        let result = detector().detect("zwavhuḓi");
        assert_eq!(result.code(), "ve");
        assert_eq!(result.method(), DetectionMethod::DistinctiveFeature);
        assert_eq!(result.confidence(), 0.95);
        assert!(!result.is_hybrid());
    }

    #[test]
    fn test_sepedi_distinctive_character() {
        let result = detector().detect("Ke kgopela thušo");
        assert_eq!(result.code(), "nso");
        assert_eq!(result.method(), DetectionMethod::DistinctiveFeature);
    }

    #[test]
    fn test_afrikaans_circumflex_short_circuits() {
        let result = detector().detect("Goeie môre, hoe gaan dit?");
        assert_eq!(result.code(), "af");
        assert_eq!(result.family(), LanguageFamily::Germanic);
    }

    #[test]
    fn test_english_greeting() {
        let result = detector().detect("hello how are you");
        assert_eq!(result.code(), "en");
        assert_eq!(result.method(), DetectionMethod::Vocabulary);
        assert!(result.confidence() > 0.35);
    }

    #[test]
    fn test_zulu_legal_request() {
        let result = detector().detect("Sawubona, ngicela usizo ngomthetho wami");
        assert_eq!(result.code(), "zu");
        assert_eq!(result.family(), LanguageFamily::Nguni);
        assert!(result.confidence() > 0.4);
    }

    #[test]
    fn test_xhosa_greeting() {
        let result = detector().detect("Molweni, ndicela uncedo");
        assert_eq!(result.code(), "xh");
    }

    #[test]
    fn test_setswana_sentence() {
        let result = detector().detect("Dumela rra, ke batla thuso gompieno");
        assert_eq!(result.code(), "tn");
    }

    #[test]
    fn test_xitsonga_greeting() {
        let result = detector().detect("Avuxeni, ndza kombela ku pfuneto");
        assert_eq!(result.code(), "ts");
    }

    #[test]
    fn test_hybrid_flag_tracks_confidence_band() {
        let lexicon = LexiconStore::builtin().unwrap();
        let profile = lexicon.fallback_profile();
        for (confidence, expected) in [
            (0.35, false),
            (0.36, true),
            (0.5, true),
            (0.74, true),
            (0.75, false),
            (0.95, false),
            (0.1, false),
        ] {
            let result = DetectionResult::new(profile, confidence, DetectionMethod::Vocabulary);
            assert_eq!(result.is_hybrid(), expected, "confidence {}", confidence);
        }
    }

    #[test]
    fn test_confidence_is_clamped() {
        let lexicon = LexiconStore::builtin().unwrap();
        let profile = lexicon.fallback_profile();
        let high = DetectionResult::new(profile, 3.0, DetectionMethod::Vocabulary);
        assert_eq!(high.confidence(), 1.0);
        let nan = DetectionResult::new(profile, f64::NAN, DetectionMethod::Vocabulary);
        assert_eq!(nan.confidence(), 0.0);
    }

    #[test]
    fn test_serialized_result_exposes_hybrid_flag() {
        let result = detector().detect("");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["code"], "en");
        assert_eq!(json["is_hybrid"], false);
        assert_eq!(json["method"], "fallback");
        assert_eq!(json["family"], "germanic");
    }

    #[test]
    fn test_vocabulary_score_curve() {
        let detector = detector();
        let scores = detector.stage_scores("hello");
        let en = detector.lexicon().index_of("en").unwrap();
        // one exact token: 0.5 + 1 * 0.2
        assert!((scores[en].vocabulary - 0.7).abs() < 1e-9);

        let scores = detector.stage_scores("hello please help with this");
        assert_eq!(scores[en].vocabulary, 1.0);
    }

    #[test]
    fn test_vocabulary_substring_counts_half() {
        let detector = detector();
        let zu = detector.lexicon().index_of("zu").unwrap();
        // "ngiyabonga" appears only inside a longer word
        let scores = detector.stage_scores("xngiyabongax");
        assert!((scores[zu].vocabulary - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_ngram_skipped_for_short_text() {
        let detector = detector();
        let scores = detector.stage_scores("the");
        assert!(scores.iter().all(|s| s.ngram == 0.0));
    }

    #[test]
    fn test_ngram_ratio() {
        let detector = detector();
        let en = detector.lexicon().index_of("en").unwrap();
        // windows: "the", "hen" -> one English fingerprint out of two
        let scores = detector.stage_scores("then");
        assert!((scores[en].ngram - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_morphology_damped_across_family() {
        let detector = detector();
        let lexicon = detector.lexicon();
        let scores = detector.stage_scores("ngicela ngifuna");
        let zu = scores[lexicon.index_of("zu").unwrap()].morphology;
        let xh = scores[lexicon.index_of("xh").unwrap()].morphology;
        let nr = scores[lexicon.index_of("nr").unwrap()].morphology;
        assert!((zu - 0.2).abs() < 1e-9);
        assert!((xh - 0.19).abs() < 1e-9);
        assert!((nr - 0.15).abs() < 1e-9);
        assert_eq!(scores[lexicon.index_of("en").unwrap()].morphology, 0.0);
    }

    #[test]
    fn test_morphology_capped() {
        let detector = detector();
        let zu = detector.lexicon().index_of("zu").unwrap();
        let text = "ngicela ngifuna ngiyaphila ngomthetho ngakho ukuthi";
        let scores = detector.stage_scores(text);
        assert!((scores[zu].morphology - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_cultural_markers_add_per_marker() {
        let detector = detector();
        let en = detector.lexicon().index_of("en").unwrap();
        let scores = detector.stage_scores("good morning and thank you");
        assert!((scores[en].cultural - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_single_word_cultural_marker_needs_word_boundaries() {
        let detector = detector();
        let st = detector.lexicon().index_of("st").unwrap();

        let scores = detector.stage_scores("summer programme");
        assert_eq!(scores[st].cultural, 0.0);
        let result = detector.detect("summer programme");
        assert_eq!(result.code(), "en");
        assert_eq!(result.method(), DetectionMethod::Fallback);

        let scores = detector.stage_scores("dumela mme");
        assert!(scores[st].cultural > 0.0);
    }

    #[test]
    fn test_dominant_stage_ties_prefer_vocabulary() {
        let config = DetectionConfig::default();
        let scores = StageScores {
            vocabulary: 0.3,
            morphology: 0.5,
            ngram: 0.0,
            cultural: 0.0,
        };
        // 0.15 vs 0.15
        assert_eq!(scores.dominant(&config), DetectionMethod::Vocabulary);
    }

    #[test]
    fn test_tokenize_keeps_apostrophes() {
        let tokens = tokenize("dis 'n boek, nè?");
        assert!(tokens.contains("'n"));
        assert!(tokens.contains("boek"));
        assert!(!tokens.contains(","));
    }

    #[test]
    fn test_normalize_collapses_non_letters() {
        assert_eq!(normalize_for_ngrams("  hi,   there!! 42 "), "hi there");
    }
}
