// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod ideas;
pub mod ingest;
pub mod knowledge;
pub mod metrics;
pub mod report;
pub mod sentiment;
pub mod stats;
pub mod text;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{CorpusAggregator, TopicAnalysis};
pub use crate::api::{create_router, AppState};
pub use crate::ideas::{IdeaGenerator, IdeaScorer, RelevanceStrategy, ScoreResult};
pub use crate::ingest::types::{Post, PostProvider};
pub use crate::knowledge::KnowledgeBase;
pub use crate::sentiment::{SentimentAnalyzer, SentimentCategory};
pub use crate::text::LanguageConfig;
