//! Scores a free-text idea against an accumulated knowledge base.
//!
//! Produces relevance (overlap with known vocabulary), novelty (fresh
//! vocabulary share), document sentiment, and a composite 0–100 score with a
//! reception category, recommendation tier, and improvement suggestions.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::knowledge::KnowledgeBase;
use crate::sentiment::SentimentAnalyzer;
use crate::text::{tokenize_words, LanguageConfig};

/// Similarity cutoff for a fuzzy hashtag hit (normalized edit distance).
const SIMILARITY_THRESHOLD: f64 = 0.7;
/// Forward-looking marker words that nudge relevance.
const FORWARD_MARKERS: [&str; 4] = ["futuro", "tendencia", "impacto", "cambio"];

/// Named relevance formulas. They are deliberately not assumed equivalent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceStrategy {
    /// Four weighted terms: keywords, hashtags, mentions, marker words.
    #[default]
    Weighted,
    /// Two-term variant: keywords and hashtags only, reweighted.
    Compact,
}

/// Estimated public reception from the idea's own sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reception {
    #[serde(rename = "Muy positiva")]
    VeryPositive,
    #[serde(rename = "Positiva")]
    Positive,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Negativa")]
    Negative,
    #[serde(rename = "Muy negativa")]
    VeryNegative,
}

impl Reception {
    pub fn from_compound(s: f64) -> Self {
        if s >= 0.15 {
            Reception::VeryPositive
        } else if s >= 0.05 {
            Reception::Positive
        } else if s <= -0.15 {
            Reception::VeryNegative
        } else if s <= -0.05 {
            Reception::Negative
        } else {
            Reception::Neutral
        }
    }
}

impl fmt::Display for Reception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Reception::VeryPositive => "Muy positiva",
            Reception::Positive => "Positiva",
            Reception::Neutral => "Neutral",
            Reception::Negative => "Negativa",
            Reception::VeryNegative => "Muy negativa",
        };
        f.write_str(s)
    }
}

/// Recommendation tier from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Excellent,
    Good,
    NeedsDevelopment,
}

impl Tier {
    pub fn from_composite(score: f64) -> Self {
        if score > 75.0 {
            Tier::Excellent
        } else if score > 50.0 {
            Tier::Good
        } else {
            Tier::NeedsDevelopment
        }
    }

    /// Human-readable recommendation line.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Tier::Excellent => "Excelente tema con alta probabilidad de convertirse en tendencia",
            Tier::Good => "Buen tema con potencial de crecimiento",
            Tier::NeedsDevelopment => "Tema interesante pero puede necesitar más desarrollo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Composite trend score in [0, 100].
    pub composite: f64,
    pub relevance: f64,
    pub novelty: f64,
    /// Document-level compound of the raw idea text.
    pub sentiment: f64,
    pub reception: Reception,
    pub tier: Tier,
    pub keyword_matches: usize,
    pub hashtag_matches: usize,
    pub mention_matches: usize,
    pub suggestions: Vec<String>,
}

pub struct IdeaScorer<'a> {
    analyzer: &'a SentimentAnalyzer,
    language: &'a LanguageConfig,
    strategy: RelevanceStrategy,
}

impl<'a> IdeaScorer<'a> {
    pub fn new(analyzer: &'a SentimentAnalyzer, language: &'a LanguageConfig) -> Self {
        Self {
            analyzer,
            language,
            strategy: RelevanceStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: RelevanceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Score one idea. Errors (malformed knowledge base, unusable input) are
    /// recoverable: the caller may retry with a different idea.
    pub fn score(&self, idea: &str, kb: &KnowledgeBase) -> Result<ScoreResult> {
        kb.validate().context("idea scoring aborted")?;

        let idea_lower = idea.to_lowercase();
        let tokens = tokenize_words(&idea_lower);
        let token_set = self.language.content_token_set(&tokens);
        let vocab = kb.keyword_vocab();

        let hashtag_matches = kb
            .hashtags
            .iter()
            .filter(|(tag, _)| {
                token_set
                    .iter()
                    .any(|t| strsim::normalized_levenshtein(tag, t) > SIMILARITY_THRESHOLD)
            })
            .count();
        let keyword_matches = token_set.iter().filter(|t| vocab.contains(*t)).count();
        let mention_matches = kb
            .mentioned_users
            .iter()
            .filter(|(user, _)| token_set.iter().any(|t| t.contains(user.as_str())))
            .count();
        let has_marker = FORWARD_MARKERS.iter().any(|m| idea_lower.contains(m));

        let relevance = match self.strategy {
            RelevanceStrategy::Weighted => {
                0.4 * (keyword_matches as f64 / 5.0).min(1.0)
                    + 0.3 * (hashtag_matches as f64 / 3.0).min(1.0)
                    + 0.2 * (mention_matches as f64 / 2.0).min(1.0)
                    + 0.1 * if has_marker { 1.0 } else { 0.0 }
            }
            RelevanceStrategy::Compact => {
                0.6 * (keyword_matches as f64 / 5.0).min(1.0)
                    + 0.4 * (hashtag_matches as f64 / 3.0).min(1.0)
            }
        };

        let novel_tokens = token_set
            .iter()
            .filter(|t| t.chars().count() > 4 && !vocab.contains(*t))
            .count();
        let novelty = (novel_tokens as f64 / 3.0).min(1.0);

        let sentiment = self.analyzer.compound(idea);
        let composite = composite_score(relevance, novelty, sentiment);

        let mut suggestions = Vec::new();
        if keyword_matches < 2 {
            suggestions.push("Considera incluir más palabras clave relevantes".to_string());
        }
        if hashtag_matches == 0 {
            suggestions.push("Relaciona con hashtags populares del tema".to_string());
        }
        if novelty < 0.3 {
            suggestions.push("Añade elementos innovadores o de actualidad".to_string());
        }

        tracing::debug!(
            target: "idea_score",
            id = %anon_hash(idea),
            composite,
            relevance,
            novelty,
            sentiment,
            "idea scored"
        );

        Ok(ScoreResult {
            composite,
            relevance,
            novelty,
            sentiment,
            reception: Reception::from_compound(sentiment),
            tier: Tier::from_composite(composite),
            keyword_matches,
            hashtag_matches,
            mention_matches,
            suggestions,
        })
    }
}

/// The composite keeps the historical formula: the sentiment term is
/// `(sentiment + 1) * 0.2` (contribution range [0, 0.4], no rescale to
/// [0, 1]). The result is rounded to two decimals and clamped to the
/// declared [0, 100] range.
pub fn composite_score(relevance: f64, novelty: f64, sentiment: f64) -> f64 {
    let raw = (relevance * 0.6 + novelty * 0.2 + (sentiment + 1.0) * 0.2) * 100.0;
    round2(raw).clamp(0.0, 100.0)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Short stable id for logs; raw idea text is never logged.
fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentCategory;
    use crate::stats::SummaryStats;

    fn kb_fixture() -> KnowledgeBase {
        KnowledgeBase {
            schema_version: crate::knowledge::KNOWLEDGE_SCHEMA_VERSION,
            topic: "tecnología".into(),
            hashtags: vec![("ia".into(), 10)],
            mentioned_users: vec![("devstudio".into(), 4)],
            dominant_sentiment: SentimentCategory::Positive,
            dominant_pct: 61.0,
            positive_words: vec![("innovador".into(), 5)],
            negative_words: vec![("fracaso".into(), 2)],
            stats: SummaryStats::from_scores(&[0.1, 0.2]),
            top_posts: vec![],
        }
    }

    fn scorer_parts() -> (SentimentAnalyzer, LanguageConfig) {
        (SentimentAnalyzer::new(), LanguageConfig::default())
    }

    #[test]
    fn composite_keeps_the_literal_sentiment_term() {
        // Neutral everything except sentiment: the term contributes
        // (s + 1) * 0.2, so a fully positive idea adds 40 points.
        assert_eq!(composite_score(0.0, 0.0, 1.0), 40.0);
        assert_eq!(composite_score(0.0, 0.0, -1.0), 0.0);
        assert_eq!(composite_score(0.0, 0.0, 0.0), 20.0);
        // The formula can exceed 100 at the extremes; the range clamp holds.
        assert_eq!(composite_score(1.0, 1.0, 1.0), 100.0);
    }

    #[test]
    fn known_idea_matches_keywords_and_scores_positive() {
        let (a, l) = scorer_parts();
        let scorer = IdeaScorer::new(&a, &l);
        let r = scorer
            .score("la inteligencia artificial es muy innovador", &kb_fixture())
            .unwrap();

        assert_eq!(r.keyword_matches, 1, "matches 'innovador'");
        assert_eq!(r.hashtag_matches, 0, "'ia' is not similar enough to any token");
        assert_eq!(r.mention_matches, 0);
        assert!((r.relevance - 0.08).abs() < 1e-9);
        assert!((r.novelty - 2.0 / 3.0).abs() < 1e-9, "inteligencia + artificial are novel");
        assert!(r.sentiment > 0.15, "boosted 'innovador' reads strongly positive");
        assert_eq!(r.reception, Reception::from_compound(r.sentiment));
        assert_eq!(r.reception, Reception::VeryPositive);
        assert!(r.composite > 0.0);

        let expected = composite_score(r.relevance, r.novelty, r.sentiment);
        assert_eq!(r.composite, expected);
    }

    #[test]
    fn scoring_is_bit_identical_across_calls() {
        let (a, l) = scorer_parts();
        let scorer = IdeaScorer::new(&a, &l);
        let kb = kb_fixture();
        let idea = "el futuro del cambio tecnológico";
        assert_eq!(scorer.score(idea, &kb).unwrap(), scorer.score(idea, &kb).unwrap());
    }

    #[test]
    fn forward_markers_only_count_in_the_weighted_strategy() {
        let (a, l) = scorer_parts();
        let kb = kb_fixture();
        let idea = "una mirada al futuro de este asunto";

        let weighted = IdeaScorer::new(&a, &l).score(idea, &kb).unwrap();
        let compact = IdeaScorer::new(&a, &l)
            .with_strategy(RelevanceStrategy::Compact)
            .score(idea, &kb)
            .unwrap();

        assert!((weighted.relevance - 0.1).abs() < 1e-9, "marker term alone");
        assert_eq!(compact.relevance, 0.0);
    }

    #[test]
    fn mentions_match_as_token_substrings() {
        let (a, l) = scorer_parts();
        let kb = kb_fixture();
        let r = IdeaScorer::new(&a, &l)
            .score("qué opina devstudio sobre este asunto", &kb)
            .unwrap();
        assert_eq!(r.mention_matches, 1);
    }

    #[test]
    fn fuzzy_hashtag_matching_tolerates_near_misses() {
        let (a, l) = scorer_parts();
        let mut kb = kb_fixture();
        kb.hashtags = vec![("tecnologia".into(), 9)];
        let r = IdeaScorer::new(&a, &l)
            .score("la tecnología avanza sin freno", &kb)
            .unwrap();
        assert_eq!(r.hashtag_matches, 1, "accent-stripped tag is close enough");
    }

    #[test]
    fn suggestions_trigger_independently() {
        let (a, l) = scorer_parts();
        let kb = kb_fixture();
        // No keyword/hashtag overlap, no long novel words.
        let r = IdeaScorer::new(&a, &l).score("algo va mal hoy", &kb).unwrap();
        assert_eq!(r.suggestions.len(), 3);

        // Novel long words clear the novelty suggestion.
        let r = IdeaScorer::new(&a, &l)
            .score("perspectivas extraordinarias completamente desconocidas", &kb)
            .unwrap();
        assert!(r.novelty >= 0.3);
        assert_eq!(r.suggestions.len(), 2);
    }

    #[test]
    fn malformed_knowledge_base_is_a_recoverable_error() {
        let (a, l) = scorer_parts();
        let mut kb = kb_fixture();
        kb.topic = "".into();
        let err = IdeaScorer::new(&a, &l).score("una idea cualquiera", &kb).unwrap_err();
        assert!(format!("{err:#}").contains("malformed knowledge base"));
    }

    #[test]
    fn tier_cutoffs_are_exclusive() {
        assert_eq!(Tier::from_composite(75.0), Tier::Good);
        assert_eq!(Tier::from_composite(75.01), Tier::Excellent);
        assert_eq!(Tier::from_composite(50.0), Tier::NeedsDevelopment);
        assert_eq!(Tier::from_composite(50.01), Tier::Good);
    }

    #[test]
    fn reception_thresholds_match_the_table() {
        assert_eq!(Reception::from_compound(0.15), Reception::VeryPositive);
        assert_eq!(Reception::from_compound(0.05), Reception::Positive);
        assert_eq!(Reception::from_compound(0.0), Reception::Neutral);
        assert_eq!(Reception::from_compound(-0.05), Reception::Negative);
        assert_eq!(Reception::from_compound(-0.15), Reception::VeryNegative);
    }
}
