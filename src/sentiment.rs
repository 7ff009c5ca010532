//! Lexicon/rule-based polarity scoring.
//!
//! Valences live in `sentiment_lexicon.json` (word -> value in [-4, 4]).
//! A compound score in [-1, 1] is produced per text: token valences are
//! summed with a negation lookback and an intensifier boost, exclamation
//! marks add emphasis, and the sum is normalized as `s / sqrt(s^2 + 15)`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

/// Normalization constant (expected maximum sum of valences).
const ALPHA: f64 = 15.0;
/// Scale applied to a valence preceded by an intensifier.
const BOOSTER_SCALE: f64 = 1.293;
/// Emphasis added per exclamation mark, capped at four marks.
const EXCLAMATION_BOOST: f64 = 0.292;

/// 3-way categorization of a compound score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentCategory {
    #[serde(rename = "Positivo")]
    Positive,
    #[serde(rename = "Negativo")]
    Negative,
    #[serde(rename = "Neutral")]
    Neutral,
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SentimentCategory::Positive => "Positivo",
            SentimentCategory::Negative => "Negativo",
            SentimentCategory::Neutral => "Neutral",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Raw lexicon valence for a single lower-cased word.
    #[inline]
    pub fn word_valence(&self, w: &str) -> Option<f64> {
        LEXICON.get(w).copied()
    }

    /// Compound score of one word in isolation (no context rules).
    #[inline]
    pub fn word_compound(&self, w: &str) -> f64 {
        normalize(self.word_valence(w).unwrap_or(0.0))
    }

    /// Document-level compound score in [-1, 1].
    ///
    /// Negation: a negator within the previous 3 tokens inverts a word's
    /// valence. Intensifiers within the previous 2 tokens scale it by 1.293.
    /// Exclamation marks push the sum further in its own direction.
    pub fn compound(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut sum = 0.0f64;

        for i in 0..tokens.len() {
            let Some(base) = self.word_valence(tokens[i].as_str()) else {
                continue;
            };
            let mut v = base;
            if (1..=2).any(|k| i >= k && is_booster(tokens[i - k].as_str())) {
                v *= BOOSTER_SCALE;
            }
            if (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str())) {
                v = -v;
            }
            sum += v;
        }

        if sum != 0.0 {
            let marks = text.chars().filter(|&c| c == '!').count().min(4) as f64;
            sum += marks * EXCLAMATION_BOOST * sum.signum();
        }

        normalize(sum)
    }

    /// Category thresholds: `>= 0.05` positive, `<= -0.05` negative.
    pub fn categorize(&self, compound: f64) -> SentimentCategory {
        categorize(compound)
    }
}

/// Free-function form of the threshold rule (no analyzer state involved).
pub fn categorize(compound: f64) -> SentimentCategory {
    if compound >= 0.05 {
        SentimentCategory::Positive
    } else if compound <= -0.05 {
        SentimentCategory::Negative
    } else {
        SentimentCategory::Neutral
    }
}

#[inline]
fn normalize(sum: f64) -> f64 {
    if sum == 0.0 {
        return 0.0;
    }
    (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

/// Module tokenization: alphanumeric runs, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "no" | "nunca"
            | "jamás"
            | "ni"
            | "sin"
            | "tampoco"
            | "nada"
            | "not"
            | "never"
            | "cannot"
    )
}

fn is_booster(tok: &str) -> bool {
    matches!(
        tok,
        "muy" | "más"
            | "tan"
            | "super"
            | "súper"
            | "realmente"
            | "increíblemente"
            | "extremadamente"
            | "bastante"
            | "very"
            | "really"
            | "extremely"
    )
}
