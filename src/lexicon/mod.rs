//! Lexicon store
//!
//! Static per-language vocabulary, morphology patterns, character trigram
//! fingerprints and cultural markers. Built once at startup and shared
//! read-only (behind an `Arc`) by every detector and classifier.

pub mod categories;
mod languages;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{AppError, AppResult};

/// Language family of a supported language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageFamily {
    Germanic,
    Nguni,
    SothoTswana,
    Venda,
    Tsonga,
}

impl LanguageFamily {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Germanic => "germanic",
            Self::Nguni => "nguni",
            Self::SothoTswana => "sotho_tswana",
            Self::Venda => "venda",
            Self::Tsonga => "tsonga",
        }
    }
}

/// Static description of one supported language
///
/// Fields are private; a profile can only be built through [`LanguageProfile::new`],
/// which lowercases every entry and rejects fingerprints that are not exactly
/// three characters long.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    code: String,
    name: String,
    family: LanguageFamily,
    greeting: String,
    vocabulary: Vec<String>,
    vocabulary_set: HashSet<String>,
    fingerprints: HashSet<String>,
    cultural_markers: Vec<String>,
    distinctive_chars: Vec<char>,
}

/// Raw, borrowed form of a profile used by the embedded tables
pub(crate) struct ProfileSpec {
    pub code: &'static str,
    pub name: &'static str,
    pub family: LanguageFamily,
    pub greeting: &'static str,
    pub vocabulary: &'static [&'static str],
    pub fingerprints: &'static [&'static str],
    pub cultural_markers: &'static [&'static str],
    pub distinctive_chars: &'static [char],
}

impl LanguageProfile {
    /// Build a profile, normalising entries to lowercase
    ///
    /// # Errors
    /// Returns [`AppError::Lexicon`] if the code is empty or a fingerprint is
    /// not exactly three characters.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        code: &str,
        name: &str,
        family: LanguageFamily,
        greeting: &str,
        vocabulary: &[&str],
        fingerprints: &[&str],
        cultural_markers: &[&str],
        distinctive_chars: &[char],
    ) -> AppResult<Self> {
        if code.trim().is_empty() {
            return Err(AppError::Lexicon("language code cannot be empty".to_string()));
        }

        // Ordered and de-duplicated
        let mut vocabulary_set = HashSet::new();
        let mut ordered = Vec::with_capacity(vocabulary.len());
        for word in vocabulary {
            let word = word.to_lowercase();
            if !word.is_empty() && vocabulary_set.insert(word.clone()) {
                ordered.push(word);
            }
        }

        let mut fingerprint_set = HashSet::new();
        for gram in fingerprints {
            let gram = gram.to_lowercase();
            if gram.chars().count() != 3 {
                return Err(AppError::Lexicon(format!(
                    "fingerprint '{}' for language '{}' must be exactly 3 characters",
                    gram, code
                )));
            }
            fingerprint_set.insert(gram);
        }

        let mut markers: Vec<String> = Vec::with_capacity(cultural_markers.len());
        for marker in cultural_markers {
            let marker = marker.to_lowercase();
            if !marker.is_empty() && !markers.contains(&marker) {
                markers.push(marker);
            }
        }

        Ok(Self {
            code: code.to_string(),
            name: name.to_string(),
            family,
            greeting: greeting.to_string(),
            vocabulary: ordered,
            vocabulary_set,
            fingerprints: fingerprint_set,
            cultural_markers: markers,
            distinctive_chars: distinctive_chars.to_vec(),
        })
    }

    fn from_spec(spec: &ProfileSpec) -> AppResult<Self> {
        Self::new(
            spec.code,
            spec.name,
            spec.family,
            spec.greeting,
            spec.vocabulary,
            spec.fingerprints,
            spec.cultural_markers,
            spec.distinctive_chars,
        )
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> LanguageFamily {
        self.family
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    /// High-frequency vocabulary in declaration order
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Whether `token` is an exact vocabulary entry
    pub fn has_word(&self, token: &str) -> bool {
        self.vocabulary_set.contains(token)
    }

    /// Whether `gram` is one of this language's trigram fingerprints
    pub fn has_fingerprint(&self, gram: &str) -> bool {
        self.fingerprints.contains(gram)
    }

    pub fn cultural_markers(&self) -> &[String] {
        &self.cultural_markers
    }

    /// Characters that, on their own, identify this language
    pub fn distinctive_chars(&self) -> &[char] {
        &self.distinctive_chars
    }
}

/// Family-level morphology rule
///
/// Every regex match in the text counts as one hit for the family. The family
/// score is then spread over member languages scaled by their damping factor.
#[derive(Debug, Clone)]
pub struct MorphologyRule {
    family: LanguageFamily,
    patterns: Vec<Regex>,
    members: Vec<(String, f64)>,
}

pub(crate) struct MorphologySpec {
    pub family: LanguageFamily,
    pub patterns: &'static [&'static str],
    pub members: &'static [(&'static str, f64)],
}

impl MorphologyRule {
    /// Compile a morphology rule
    ///
    /// # Errors
    /// Returns [`AppError::Lexicon`] for an invalid regex or a damping factor
    /// outside (0, 1].
    pub fn new(
        family: LanguageFamily,
        patterns: &[&str],
        members: &[(&str, f64)],
    ) -> AppResult<Self> {
        let compiled = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    AppError::Lexicon(format!(
                        "invalid morphology pattern '{}' for {}: {}",
                        p,
                        family.as_str(),
                        e
                    ))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        for (code, damping) in members {
            if !(*damping > 0.0 && *damping <= 1.0) {
                return Err(AppError::Lexicon(format!(
                    "damping factor for '{}' must be in (0, 1], got {}",
                    code, damping
                )));
            }
        }

        Ok(Self {
            family,
            patterns: compiled,
            members: members
                .iter()
                .map(|(code, damping)| (code.to_string(), *damping))
                .collect(),
        })
    }

    pub fn family(&self) -> LanguageFamily {
        self.family
    }

    /// Total number of pattern matches in `text`
    pub fn count_hits(&self, text: &str) -> usize {
        self.patterns.iter().map(|re| re.find_iter(text).count()).sum()
    }

    /// Member languages and their damping factors
    pub fn members(&self) -> &[(String, f64)] {
        &self.members
    }
}

/// Immutable collection of language profiles and morphology rules
#[derive(Debug, Clone)]
pub struct LexiconStore {
    profiles: Vec<LanguageProfile>,
    morphology: Vec<MorphologyRule>,
    fallback: usize,
}

impl LexiconStore {
    /// Assemble a store from profiles and rules
    ///
    /// # Errors
    /// Returns [`AppError::Lexicon`] if codes are duplicated, the fallback code
    /// is unknown, or a morphology rule names an unknown language.
    pub fn new(
        profiles: Vec<LanguageProfile>,
        morphology: Vec<MorphologyRule>,
        fallback_code: &str,
    ) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for profile in &profiles {
            if !seen.insert(profile.code()) {
                return Err(AppError::Lexicon(format!(
                    "duplicate language code '{}'",
                    profile.code()
                )));
            }
        }

        for rule in &morphology {
            for (code, _) in rule.members() {
                if !seen.contains(code.as_str()) {
                    return Err(AppError::Lexicon(format!(
                        "morphology rule for {} references unknown language '{}'",
                        rule.family().as_str(),
                        code
                    )));
                }
            }
        }

        let fallback = profiles
            .iter()
            .position(|p| p.code() == fallback_code)
            .ok_or_else(|| {
                AppError::Lexicon(format!("fallback language '{}' is not defined", fallback_code))
            })?;

        Ok(Self {
            profiles,
            morphology,
            fallback,
        })
    }

    /// The embedded lexicon for the eleven supported languages
    pub fn builtin() -> AppResult<Self> {
        let profiles = languages::PROFILES
            .iter()
            .map(LanguageProfile::from_spec)
            .collect::<AppResult<Vec<_>>>()?;

        let morphology = languages::MORPHOLOGY
            .iter()
            .map(|spec| MorphologyRule::new(spec.family, spec.patterns, spec.members))
            .collect::<AppResult<Vec<_>>>()?;

        let store = Self::new(profiles, morphology, languages::FALLBACK_CODE)?;

        tracing::info!(
            languages = store.profiles.len(),
            morphology_rules = store.morphology.len(),
            fallback = %store.fallback_profile().code(),
            "Lexicon store loaded"
        );

        Ok(store)
    }

    /// Profiles in declaration order (the tie-break order)
    pub fn profiles(&self) -> &[LanguageProfile] {
        &self.profiles
    }

    pub fn morphology(&self) -> &[MorphologyRule] {
        &self.morphology
    }

    pub fn profile(&self, code: &str) -> Option<&LanguageProfile> {
        self.profiles.iter().find(|p| p.code() == code)
    }

    /// Position of `code` in declaration order
    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.code() == code)
    }

    /// Language returned when nothing scores
    pub fn fallback_profile(&self) -> &LanguageProfile {
        &self.profiles[self.fallback]
    }
}
