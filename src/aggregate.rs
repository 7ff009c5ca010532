//! # Corpus Aggregator
//! Pure, testable logic that maps a collection of posts to the per-topic
//! summary: sentiment distribution, monthly trend, strong-word/hashtag/
//! mention rankings, engagement leaders, and descriptive statistics.
//! No I/O; the knowledge base artifact is derived from the result.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use serde::Serialize;

use crate::ingest::types::Post;
use crate::knowledge::{KnowledgeBase, TopPost, KNOWLEDGE_SCHEMA_VERSION};
use crate::sentiment::{SentimentAnalyzer, SentimentCategory};
use crate::stats::SummaryStats;
use crate::text::{raw_tokens, strip_marker, LanguageConfig};

/// Token-level cutoff for "strongly charged" words. Stricter than the ±0.05
/// document thresholds so only unambiguous single words surface.
const STRONG_WORD_THRESHOLD: f64 = 0.5;
/// Share above which a category counts as a marked trend.
const MARKED_TREND_PCT: f64 = 60.0;

const TOP_WORDS: usize = 10;
const TOP_HASHTAGS: usize = 20;
const TOP_MENTIONS: usize = 10;
const TOP_POSTS: usize = 5;

/// Frequency table with deterministic ranking: descending count, ties broken
/// by first-seen insertion order.
#[derive(Debug, Default)]
pub struct FreqTable {
    counts: HashMap<String, (u64, usize)>,
    next_index: usize,
}

impl FreqTable {
    pub fn add(&mut self, key: String) {
        match self.counts.entry(key) {
            Entry::Occupied(mut o) => o.get_mut().0 += 1,
            Entry::Vacant(v) => {
                v.insert((1, self.next_index));
                self.next_index += 1;
            }
        }
    }

    pub fn ranked(self) -> Vec<(String, u64)> {
        let mut rows: Vec<(String, u64, usize)> = self
            .counts
            .into_iter()
            .map(|(k, (c, i))| (k, c, i))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        rows.into_iter().map(|(k, c, _)| (k, c)).collect()
    }
}

/// Category tallies over the corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentBreakdown {
    pub fn record(&mut self, cat: SentimentCategory) {
        match cat {
            SentimentCategory::Positive => self.positive += 1,
            SentimentCategory::Negative => self.negative += 1,
            SentimentCategory::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    pub fn pct(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / total as f64
        }
    }

    /// `(category, count)` in the fixed evaluation order.
    pub fn shares(&self) -> [(SentimentCategory, usize); 3] {
        [
            (SentimentCategory::Positive, self.positive),
            (SentimentCategory::Negative, self.negative),
            (SentimentCategory::Neutral, self.neutral),
        ]
    }

    /// Highest-share category; ties resolve in the order Positive,
    /// Negative, Neutral.
    pub fn dominant(&self) -> (SentimentCategory, f64) {
        let mut best = (SentimentCategory::Positive, self.positive);
        for (cat, count) in self.shares() {
            if count > best.1 {
                best = (cat, count);
            }
        }
        (best.0, self.pct(best.1))
    }
}

/// Dominant-trend call: `marked` iff the leading share reaches 60%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendCall {
    pub category: SentimentCategory,
    pub pct: f64,
    pub marked: bool,
}

impl TrendCall {
    pub fn from_breakdown(b: &SentimentBreakdown) -> Self {
        let (category, pct) = b.dominant();
        Self {
            category,
            pct,
            marked: pct >= MARKED_TREND_PCT,
        }
    }
}

/// Everything the aggregation produces for one topic. The knowledge base is
/// a projection of this; the plain-text report renders it.
#[derive(Debug, Clone, Serialize)]
pub struct TopicAnalysis {
    pub topic: String,
    pub total_posts: usize,
    pub first_post_at: String,
    pub last_post_at: String,
    pub languages: Vec<String>,
    /// `YYYY-MM -> count`, ascending by month.
    pub monthly_trend: Vec<(String, u64)>,
    pub breakdown: SentimentBreakdown,
    pub trend: TrendCall,
    pub positive_words: Vec<(String, u64)>,
    pub negative_words: Vec<(String, u64)>,
    /// Digit-free, marker-stripped, top 20.
    pub hashtags: Vec<(String, u64)>,
    pub mentions: Vec<(String, u64)>,
    pub stats: SummaryStats,
    pub top_posts: Vec<TopPost>,
}

impl TopicAnalysis {
    /// Project the persisted artifact out of the analysis.
    pub fn knowledge_base(&self) -> KnowledgeBase {
        KnowledgeBase {
            schema_version: KNOWLEDGE_SCHEMA_VERSION,
            topic: self.topic.clone(),
            hashtags: self.hashtags.clone(),
            mentioned_users: self.mentions.clone(),
            dominant_sentiment: self.trend.category,
            dominant_pct: self.trend.pct,
            positive_words: self.positive_words.clone(),
            negative_words: self.negative_words.clone(),
            stats: self.stats.clone(),
            top_posts: self.top_posts.clone(),
        }
    }
}

pub struct CorpusAggregator<'a> {
    analyzer: &'a SentimentAnalyzer,
    language: &'a LanguageConfig,
}

impl<'a> CorpusAggregator<'a> {
    pub fn new(analyzer: &'a SentimentAnalyzer, language: &'a LanguageConfig) -> Self {
        Self { analyzer, language }
    }

    /// Run the full aggregation. Fails fast on an empty corpus so no
    /// degenerate statistics are ever produced.
    pub fn analyze(&self, topic: &str, posts: &[Post]) -> Result<TopicAnalysis> {
        if posts.is_empty() {
            anyhow::bail!("no posts to analyze for topic '{topic}'");
        }

        let mut compounds = Vec::with_capacity(posts.len());
        let mut breakdown = SentimentBreakdown::default();
        let mut monthly: BTreeMap<String, u64> = BTreeMap::new();
        let mut languages: Vec<String> = Vec::new();

        let mut positive_words = FreqTable::default();
        let mut negative_words = FreqTable::default();
        let mut hashtags = FreqTable::default();
        let mut mentions = FreqTable::default();

        for post in posts {
            let compound = self.analyzer.compound(&post.text);
            breakdown.record(self.analyzer.categorize(compound));
            compounds.push(compound);

            *monthly.entry(post.month_key()).or_insert(0) += 1;
            if !languages.contains(&post.language) {
                languages.push(post.language.clone());
            }

            for token in raw_tokens(&post.text) {
                if let Some(rest) = token.strip_prefix('#') {
                    if !rest.is_empty() {
                        hashtags.add(strip_marker(&token));
                    }
                } else if let Some(rest) = token.strip_prefix('@') {
                    if !rest.is_empty() {
                        mentions.add(strip_marker(&token));
                    }
                } else if self.language.is_valid_token(&token) {
                    let word_score = self.analyzer.word_compound(&token);
                    if word_score >= STRONG_WORD_THRESHOLD {
                        positive_words.add(token);
                    } else if word_score <= -STRONG_WORD_THRESHOLD {
                        negative_words.add(token);
                    }
                }
            }
        }

        let first = posts.iter().map(|p| p.timestamp).min().expect("non-empty");
        let last = posts.iter().map(|p| p.timestamp).max().expect("non-empty");

        let mut by_engagement: Vec<&Post> = posts.iter().collect();
        by_engagement.sort_by(|a, b| {
            b.engagement_score()
                .partial_cmp(&a.engagement_score())
                .expect("finite engagement")
        });
        let top_posts = by_engagement
            .into_iter()
            .take(TOP_POSTS)
            .map(|p| TopPost {
                post: p.clone(),
                engagement: p.engagement_score(),
            })
            .collect();

        let hashtags_ranked = hashtags
            .ranked()
            .into_iter()
            .filter(|(tag, _)| !tag.chars().any(|c| c.is_ascii_digit()))
            .take(TOP_HASHTAGS)
            .collect();

        Ok(TopicAnalysis {
            topic: topic.to_string(),
            total_posts: posts.len(),
            first_post_at: first.format("%Y-%m-%d %H:%M:%S").to_string(),
            last_post_at: last.format("%Y-%m-%d %H:%M:%S").to_string(),
            languages,
            monthly_trend: monthly.into_iter().collect(),
            trend: TrendCall::from_breakdown(&breakdown),
            breakdown,
            positive_words: positive_words.ranked().into_iter().take(TOP_WORDS).collect(),
            negative_words: negative_words.ranked().into_iter().take(TOP_WORDS).collect(),
            hashtags: hashtags_ranked,
            mentions: mentions.ranked().into_iter().take(TOP_MENTIONS).collect(),
            stats: SummaryStats::from_scores(&compounds),
            top_posts,
        })
    }
}
