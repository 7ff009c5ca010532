// src/text.rs
//! Text normalization primitives: tokenizers, boundary punctuation trimming,
//! token validity, and the per-language vocabulary config.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_LANGUAGE_CONFIG_PATH: &str = "config/language_es.toml";
pub const ENV_LANGUAGE_CONFIG_PATH: &str = "LANGUAGE_CONFIG_PATH";

/// Embedded default so the crate works without an external config tree.
const DEFAULT_LANGUAGE_TOML: &str = include_str!("../config/language_es.toml");

/// Punctuation trimmed from token boundaries (inner characters are kept).
const BOUNDARY_PUNCT: &[char] = &[
    '.', ',', '!', '?', '"', '\'', ':', ';', '(', ')', '[', ']', '{', '}', '¡', '¿',
];

/// Basic, Unicode-friendly word tokenizer: lower-cased `\w+` runs.
pub fn tokenize_words(input: &str) -> Vec<String> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w+\b").expect("tokenizer regex"));
    RE.find_iter(input)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Whitespace-split candidates with boundary punctuation stripped and case
/// folded. Unlike [`tokenize_words`] this keeps `#`/`@`/URL markers intact so
/// callers can route hashtags and mentions separately.
pub fn raw_tokens(input: &str) -> impl Iterator<Item = String> + '_ {
    input
        .split_whitespace()
        .map(|w| w.trim_matches(BOUNDARY_PUNCT).to_lowercase())
        .filter(|w| !w.is_empty())
}

/// Strip the leading marker (`#`, `@`) and any trailing boundary punctuation
/// from a raw token, returning the bare lower-cased tag/handle.
pub fn strip_marker(token: &str) -> String {
    token
        .trim_start_matches(['#', '@'])
        .trim_matches(BOUNDARY_PUNCT)
        .to_lowercase()
}

/// Per-language vocabularies, supplied as configuration so tests can
/// substitute deterministic fixtures.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub code: String,
    stopwords: HashSet<String>,
    slang: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct LanguageRoot {
    language: LanguageSection,
}

#[derive(Debug, Deserialize)]
struct LanguageSection {
    code: String,
    stopwords: Vec<String>,
    slang: Vec<String>,
}

impl LanguageConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let root: LanguageRoot = toml::from_str(toml_str)?;
        Ok(Self {
            code: root.language.code,
            stopwords: root.language.stopwords.into_iter().map(|w| w.to_lowercase()).collect(),
            slang: root.language.slang.into_iter().map(|w| w.to_lowercase()).collect(),
        })
    }

    /// Load from `LANGUAGE_CONFIG_PATH` (or the default path), falling back
    /// to the embedded Spanish defaults when no file is present.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_LANGUAGE_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LANGUAGE_CONFIG_PATH));
        match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| {
                anyhow::anyhow!("invalid language config at {}: {}", path.display(), e)
            }),
            Err(_) => Self::from_toml_str(DEFAULT_LANGUAGE_TOML),
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn is_slang(&self, word: &str) -> bool {
        self.slang.contains(word)
    }

    /// Validity predicate for keyword extraction: long enough, no URL or
    /// mention/hashtag marker, purely alphabetic, and not in either closed
    /// vocabulary. Expects an already lower-cased candidate.
    pub fn is_valid_token(&self, token: &str) -> bool {
        token.chars().count() > 3
            && !token.starts_with("http")
            && !token.starts_with('@')
            && !token.starts_with('#')
            && token.chars().all(|c| c.is_alphabetic())
            && !self.is_stopword(token)
            && !self.is_slang(token)
    }

    /// Remove stopwords from a token stream and collapse duplicates.
    pub fn content_token_set(&self, tokens: &[String]) -> HashSet<String> {
        tokens
            .iter()
            .filter(|t| !self.is_stopword(t))
            .cloned()
            .collect()
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self::from_toml_str(DEFAULT_LANGUAGE_TOML).expect("embedded language config is valid")
    }
}
