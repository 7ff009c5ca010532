// src/api.rs
//! HTTP surface over the core pipeline. Thin glue: handlers validate input,
//! call the synchronous core, and share the latest analysis behind a lock.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::aggregate::{CorpusAggregator, TopicAnalysis};
use crate::ideas::{IdeaGenerator, IdeaScorer, RelevanceStrategy, ScoreResult};
use crate::ingest::types::{Post, PostProvider};
use crate::ingest::json_dir::JsonDirProvider;
use crate::knowledge::KnowledgeBase;
use crate::report;
use crate::sentiment::SentimentAnalyzer;
use crate::text::LanguageConfig;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("analyses_total", "Completed corpus aggregations.");
        describe_counter!("idea_scores_total", "Ideas scored against a knowledge base.");
        describe_counter!("ideas_generated_total", "Ideas produced by the generator.");
    });
}

/// Latest aggregation owned by the service; one writer (analyze handlers),
/// many readers (score/ideas/report).
struct TopicState {
    analysis: TopicAnalysis,
    kb: KnowledgeBase,
}

#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<SentimentAnalyzer>,
    language: Arc<LanguageConfig>,
    current: Arc<RwLock<Option<TopicState>>>,
}

impl AppState {
    pub fn new(language: LanguageConfig) -> Self {
        Self {
            analyzer: Arc::new(SentimentAnalyzer::new()),
            language: Arc::new(language),
            current: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_env() -> Self {
        let language = LanguageConfig::from_env().unwrap_or_default();
        Self::new(language)
    }
}

pub fn create_router(state: AppState) -> Router {
    ensure_metrics_described();

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/analyze-topic", post(analyze_topic))
        .route("/score", post(score_idea))
        .route("/ideas", post(generate_ideas))
        .route("/kb", get(current_kb))
        .route("/report", get(current_report))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type ApiError = (StatusCode, String);

fn unprocessable(e: anyhow::Error) -> ApiError {
    (StatusCode::UNPROCESSABLE_ENTITY, format!("{e:#}"))
}

fn no_analysis() -> ApiError {
    (
        StatusCode::CONFLICT,
        "no analysis loaded yet; POST /analyze first".to_string(),
    )
}

#[derive(Deserialize)]
struct AnalyzeReq {
    topic: String,
    posts: Vec<Post>,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<TopicAnalysis>, ApiError> {
    let aggregator = CorpusAggregator::new(&state.analyzer, &state.language);
    let analysis = aggregator
        .analyze(&body.topic, &body.posts)
        .map_err(unprocessable)?;
    store_analysis(&state, analysis.clone());
    Ok(Json(analysis))
}

#[derive(Deserialize)]
struct AnalyzeTopicReq {
    topic: String,
    dir: PathBuf,
}

/// Load every batch under `dir`, aggregate, and persist the knowledge base
/// artifact next to the batches.
async fn analyze_topic(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeTopicReq>,
) -> Result<Json<TopicAnalysis>, ApiError> {
    let provider = JsonDirProvider::new(&body.dir);
    let posts = provider.fetch_posts().await.map_err(unprocessable)?;

    let aggregator = CorpusAggregator::new(&state.analyzer, &state.language);
    let analysis = aggregator
        .analyze(&body.topic, &posts)
        .map_err(unprocessable)?;

    let kb = analysis.knowledge_base();
    let artifact = body.dir.join(KnowledgeBase::default_file_name(&body.topic));
    kb.save(&artifact).map_err(unprocessable)?;
    tracing::info!(topic = %body.topic, artifact = %artifact.display(), "knowledge base saved");

    store_analysis(&state, analysis.clone());
    Ok(Json(analysis))
}

fn store_analysis(state: &AppState, analysis: TopicAnalysis) {
    counter!("analyses_total").increment(1);
    let kb = analysis.knowledge_base();
    let mut guard = state.current.write().expect("state lock poisoned");
    *guard = Some(TopicState { analysis, kb });
}

#[derive(Deserialize)]
struct ScoreReq {
    idea: String,
    #[serde(default)]
    strategy: Option<RelevanceStrategy>,
}

async fn score_idea(
    State(state): State<AppState>,
    Json(body): Json<ScoreReq>,
) -> Result<Json<ScoreResult>, ApiError> {
    if body.idea.split_whitespace().count() < 3 {
        return Err((
            StatusCode::BAD_REQUEST,
            "la idea debe tener al menos 3 palabras".to_string(),
        ));
    }

    let guard = state.current.read().expect("state lock poisoned");
    let topic = guard.as_ref().ok_or_else(no_analysis)?;

    let scorer = IdeaScorer::new(&state.analyzer, &state.language)
        .with_strategy(body.strategy.unwrap_or_default());
    let result = scorer.score(&body.idea, &topic.kb).map_err(unprocessable)?;
    counter!("idea_scores_total").increment(1);
    Ok(Json(result))
}

#[derive(Deserialize, Default)]
struct IdeasReq {
    /// Fixed seed for reproducible output; omitted means OS entropy.
    #[serde(default)]
    seed: Option<u64>,
}

async fn generate_ideas(
    State(state): State<AppState>,
    Json(body): Json<IdeasReq>,
) -> Result<Json<Vec<String>>, ApiError> {
    let guard = state.current.read().expect("state lock poisoned");
    let topic = guard.as_ref().ok_or_else(no_analysis)?;

    let mut rng = match body.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let ideas = IdeaGenerator::default().generate(&topic.kb, &mut rng);
    counter!("ideas_generated_total").increment(ideas.len() as u64);
    Ok(Json(ideas))
}

async fn current_kb(State(state): State<AppState>) -> Result<Json<KnowledgeBase>, ApiError> {
    let guard = state.current.read().expect("state lock poisoned");
    let topic = guard.as_ref().ok_or_else(no_analysis)?;
    Ok(Json(topic.kb.clone()))
}

async fn current_report(State(state): State<AppState>) -> Result<String, ApiError> {
    let guard = state.current.read().expect("state lock poisoned");
    let topic = guard.as_ref().ok_or_else(no_analysis)?;
    Ok(report::render(&topic.analysis))
}
