//! The persisted per-topic summary artifact.
//!
//! Serialized key names keep the historical exchange contract (`tema`,
//! `hashtags`, `usuarios_mencionados`, ...) so existing downstream consumers
//! of the artifact keep working; `schema_version` is the one defensive
//! addition, checked at load time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::ingest::types::Post;
use crate::sentiment::SentimentCategory;
use crate::stats::SummaryStats;

pub const KNOWLEDGE_SCHEMA_VERSION: u32 = 1;

/// Snapshot of a high-engagement post, kept verbatim inside the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPost {
    #[serde(flatten)]
    pub post: Post,
    pub engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(rename = "tema")]
    pub topic: String,
    /// Ranked `(tag, count)` pairs, lower-cased, digit-free, marker stripped.
    pub hashtags: Vec<(String, u64)>,
    #[serde(rename = "usuarios_mencionados")]
    pub mentioned_users: Vec<(String, u64)>,
    #[serde(rename = "tendencia_sentimiento")]
    pub dominant_sentiment: SentimentCategory,
    #[serde(rename = "porcentaje_dominante")]
    pub dominant_pct: f64,
    #[serde(rename = "palabras_positivas")]
    pub positive_words: Vec<(String, u64)>,
    #[serde(rename = "palabras_negativas")]
    pub negative_words: Vec<(String, u64)>,
    #[serde(rename = "metricas_estadisticas")]
    pub stats: SummaryStats,
    #[serde(rename = "tweets_destacados", default)]
    pub top_posts: Vec<TopPost>,
}

fn default_schema_version() -> u32 {
    KNOWLEDGE_SCHEMA_VERSION
}

impl KnowledgeBase {
    /// Combined positive + negative keyword vocabulary, lower-cased.
    pub fn keyword_vocab(&self) -> HashSet<String> {
        self.positive_words
            .iter()
            .chain(self.negative_words.iter())
            .map(|(w, _)| w.to_lowercase())
            .collect()
    }

    /// Structural validation; every load path goes through this so a broken
    /// artifact fails here instead of deep inside the idea pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != KNOWLEDGE_SCHEMA_VERSION {
            anyhow::bail!(
                "malformed knowledge base: unsupported schema version {}",
                self.schema_version
            );
        }
        if self.topic.trim().is_empty() {
            anyhow::bail!("malformed knowledge base: empty topic");
        }
        if !self.dominant_pct.is_finite() || !(0.0..=100.0).contains(&self.dominant_pct) {
            anyhow::bail!(
                "malformed knowledge base: dominant percentage {} out of range",
                self.dominant_pct
            );
        }
        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let kb: KnowledgeBase =
            serde_json::from_str(raw).context("malformed knowledge base: invalid JSON")?;
        kb.validate()?;
        Ok(kb)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing knowledge base")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading knowledge base from {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = self.to_json_string()?;
        fs::write(path, raw)
            .with_context(|| format!("writing knowledge base to {}", path.display()))
    }

    /// Conventional artifact file name for a topic.
    pub fn default_file_name(topic: &str) -> String {
        format!("base_conocimiento_{topic}.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::parse_timestamp;

    fn sample_kb() -> KnowledgeBase {
        KnowledgeBase {
            schema_version: KNOWLEDGE_SCHEMA_VERSION,
            topic: "videojuegos".into(),
            hashtags: vec![("indie".into(), 12), ("gaming".into(), 7)],
            mentioned_users: vec![("devstudio".into(), 4)],
            dominant_sentiment: SentimentCategory::Positive,
            dominant_pct: 62.5,
            positive_words: vec![("divertido".into(), 9)],
            negative_words: vec![("aburrido".into(), 2)],
            stats: SummaryStats {
                mean: 0.21,
                median: 0.18,
                std_dev: 0.34,
                iqr: 0.4,
            },
            top_posts: vec![TopPost {
                post: Post {
                    id: None,
                    timestamp: parse_timestamp("2024-02-01 10:00:00").unwrap(),
                    author: "ana".into(),
                    text: "qué juego tan divertido!".into(),
                    likes: 50,
                    retweets: 10,
                    replies: 4,
                    language: "es".into(),
                    topic: None,
                    year: None,
                },
                engagement: 76.0,
            }],
        }
    }

    #[test]
    fn roundtrip_preserves_fields_and_key_names() {
        let kb = sample_kb();
        let raw = kb.to_json_string().unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        for key in [
            "schema_version",
            "tema",
            "hashtags",
            "usuarios_mencionados",
            "tendencia_sentimiento",
            "porcentaje_dominante",
            "palabras_positivas",
            "palabras_negativas",
            "metricas_estadisticas",
            "tweets_destacados",
        ] {
            assert!(v.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(v["metricas_estadisticas"]["media_sentimiento"], 0.21);
        assert_eq!(v["hashtags"][0][0], "indie");
        assert_eq!(v["tweets_destacados"][0]["Usuario"], "ana");

        let back = KnowledgeBase::from_json_str(&raw).unwrap();
        assert_eq!(back, kb);
    }

    #[test]
    fn save_and_load_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(KnowledgeBase::default_file_name("videojuegos"));
        let kb = sample_kb();
        kb.save(&path).unwrap();
        assert_eq!(KnowledgeBase::load(&path).unwrap(), kb);
    }

    #[test]
    fn malformed_artifacts_are_rejected_with_clear_errors() {
        let err = KnowledgeBase::from_json_str("{\"tema\": 3}").unwrap_err();
        assert!(err.to_string().contains("malformed knowledge base"));

        let mut bad = sample_kb();
        bad.schema_version = 99;
        let raw = bad.to_json_string().unwrap();
        let err = KnowledgeBase::from_json_str(&raw).unwrap_err();
        assert!(err.to_string().contains("schema version"));

        let mut bad = sample_kb();
        bad.dominant_pct = 140.0;
        assert!(bad.validate().is_err());

        let mut bad = sample_kb();
        bad.topic = "  ".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn keyword_vocab_merges_both_polarities() {
        let vocab = sample_kb().keyword_vocab();
        assert!(vocab.contains("divertido"));
        assert!(vocab.contains("aburrido"));
        assert_eq!(vocab.len(), 2);
    }
}
