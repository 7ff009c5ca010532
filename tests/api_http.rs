// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /analyze
// - POST /score (validation, conflict, success)
// - POST /ideas (seeded reproducibility)
// - GET /kb, GET /report

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use topic_trend_analyzer::api::{create_router, AppState};
use topic_trend_analyzer::text::LanguageConfig;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn test_router() -> Router {
    let state = AppState::new(LanguageConfig::default());
    create_router(state)
}

fn post_json(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build request")
}

fn analyze_payload() -> Json {
    json!({
        "topic": "videojuegos",
        "posts": [
            {
                "Fecha": "2024-01-10 09:00:00",
                "Usuario": "ana",
                "Texto": "Un lanzamiento excelente! #indie gracias @devstudio",
                "Likes": 10, "Retweets": 5, "Respuestas": 2, "Idioma": "es"
            },
            {
                "Fecha": "2024-01-20 10:00:00",
                "Usuario": "luis",
                "Texto": "qué juego tan divertido #indie",
                "Likes": 2, "Retweets": 0, "Respuestas": 1, "Idioma": "es"
            },
            {
                "Fecha": "2024-02-02 11:00:00",
                "Usuario": "eva",
                "Texto": "un desastre terrible, qué decepcionante",
                "Likes": 0, "Retweets": 1, "Respuestas": 0, "Idioma": "es"
            }
        ]
    })
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json body")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn api_analyze_returns_aggregation_fields() {
    let app = test_router();

    let resp = app
        .oneshot(post_json("/analyze", &analyze_payload()))
        .await
        .expect("oneshot /analyze");
    assert!(resp.status().is_success(), "got {}", resp.status());

    let v = read_json(resp).await;
    assert_eq!(v["topic"], json!("videojuegos"));
    assert_eq!(v["total_posts"], json!(3));
    assert!(v.get("breakdown").is_some(), "missing 'breakdown'");
    assert!(v.get("trend").is_some(), "missing 'trend'");
    assert!(v.get("hashtags").is_some(), "missing 'hashtags'");
    assert!(v.get("stats").is_some(), "missing 'stats'");
    assert_eq!(v["hashtags"][0][0], json!("indie"));
}

#[tokio::test]
async fn api_analyze_rejects_empty_corpus() {
    let app = test_router();
    let payload = json!({ "topic": "vacío", "posts": [] });

    let resp = app
        .oneshot(post_json("/analyze", &payload))
        .await
        .expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn api_score_requires_prior_analysis_and_three_words() {
    let app = test_router();

    // No analysis yet -> conflict.
    let resp = app
        .clone()
        .oneshot(post_json("/score", &json!({ "idea": "una idea cualquiera" })))
        .await
        .expect("oneshot /score");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Too-short idea is rejected before touching the core.
    let resp = app
        .clone()
        .oneshot(post_json("/score", &json!({ "idea": "muy corta" })))
        .await
        .expect("oneshot /score");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn api_score_after_analyze_returns_score_result() {
    let app = test_router();

    let resp = app
        .clone()
        .oneshot(post_json("/analyze", &analyze_payload()))
        .await
        .expect("analyze");
    assert!(resp.status().is_success());

    let resp = app
        .clone()
        .oneshot(post_json(
            "/score",
            &json!({ "idea": "el futuro del juego indie es muy divertido" }),
        ))
        .await
        .expect("score");
    assert!(resp.status().is_success(), "got {}", resp.status());

    let v = read_json(resp).await;
    for key in [
        "composite",
        "relevance",
        "novelty",
        "sentiment",
        "reception",
        "tier",
        "suggestions",
    ] {
        assert!(v.get(key).is_some(), "missing '{key}'");
    }
    let composite = v["composite"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&composite));
}

#[tokio::test]
async fn api_ideas_are_reproducible_with_a_seed() {
    let app = test_router();

    let resp = app
        .clone()
        .oneshot(post_json("/analyze", &analyze_payload()))
        .await
        .expect("analyze");
    assert!(resp.status().is_success());

    let mut runs = Vec::new();
    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(post_json("/ideas", &json!({ "seed": 42 })))
            .await
            .expect("ideas");
        assert!(resp.status().is_success());
        runs.push(read_json(resp).await);
    }
    assert_eq!(runs[0], runs[1], "same seed must reproduce the same ideas");
    assert!(runs[0].as_array().is_some());
}

#[tokio::test]
async fn api_kb_and_report_expose_the_current_analysis() {
    let app = test_router();

    let resp = app
        .clone()
        .oneshot(post_json("/analyze", &analyze_payload()))
        .await
        .expect("analyze");
    assert!(resp.status().is_success());

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/kb")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("kb");
    assert!(resp.status().is_success());
    let v = read_json(resp).await;
    assert_eq!(v["tema"], json!("videojuegos"));
    assert!(v.get("metricas_estadisticas").is_some());

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/report")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("report");
    assert!(resp.status().is_success());
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap().to_vec();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("REPORTE COMPLETO: VIDEOJUEGOS"));
}
