//! Router tests via `tower::ServiceExt::oneshot`; no backend configured.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use testsmith::domain::Category;
use testsmith::routes::build_router;
use testsmith::state::AppState;

fn app() -> (Arc<AppState>, Router) {
    let state = Arc::new(AppState::default());
    (state.clone(), build_router(state))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let res = app.oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
    (status, bytes.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = send(app, Request::get(uri).body(Body::empty()).unwrap()).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_reports_backend_status() {
    let (_, app) = app();
    let (status, body) = get_json(app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "aiEnabled": false }));
}

#[tokio::test]
async fn catalog_lists_all_categories() {
    let (_, app) = app();
    let (status, body) = get_json(app, "/api/v1/catalog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"].as_array().map(Vec::len), Some(Category::ALL.len()));
    assert_eq!(body["defaultQuantity"], 10);
}

#[tokio::test]
async fn format_endpoint_runs_pipeline_only() {
    let (_, app) = app();
    let (status, body) = post_json(
        app,
        "/api/v1/format",
        json!({ "content": "1: Pick.\nA. one B. two C. three D. four\n**Answers** 1. D" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let formatted = body["formatted"].as_str().unwrap();
    assert!(formatted.starts_with("Question 1. Pick."));
    assert!(formatted.contains("*D. four"));
    assert_eq!(body["answerKey"]["1"], "D");
    assert!(body["html"].as_str().unwrap().contains("options cols-4"));
}

#[tokio::test]
async fn sections_by_id_and_unknown_category() {
    let (state, app) = app();
    state.store_section(Category::Vocabulary, "Question 1. Hi".into()).await;

    let (status, body) = get_json(app.clone(), "/api/v1/sections/vocab").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isGenerated"], true);
    assert_eq!(body["formatted"], "Question 1. Hi");

    let (status, body) = get_json(app, "/api/v1/sections/poetry").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("poetry"));
}

#[tokio::test]
async fn generate_validation_errors() {
    let (state, app) = app();
    let (status, _) = post_json(app.clone(), "/api/v1/generate", json!({ "category": "Translate", "topic": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(app.clone(), "/api/v1/generate", json!({ "category": "Grammar", "topic": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let _held = state.gate.try_acquire().unwrap();
    let (status, body) = post_json(app, "/api/v1/generate", json!({ "category": "Grammar", "topic": "Travel" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn generate_without_backend_keeps_section() {
    let (_, app) = app();
    let (status, body) = post_json(app, "/api/v1/generate", json!({ "category": "Grammar", "topic": "Travel" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], false);
    assert_eq!(body["section"]["content"], "");
}

#[tokio::test]
async fn export_requires_generated_section() {
    let (state, app) = app();
    let (status, _) = send(app.clone(), Request::get("/api/v1/export?topic=Space").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    state.store_section(Category::Grammar, "Question 1. Hi\nA. a B. b C. c D. d".into()).await;
    let res = app
        .oneshot(Request::get("/api/v1/export?topic=Space%20Travel").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("Test_Space_Travel.docx"));
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn reset_clears_sections() {
    let (state, app) = app();
    state.store_section(Category::Reading, "Question 1. Hi".into()).await;
    let (status, body) = post_json(app, "/api/v1/reset", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert!(!state.section(Category::Reading).await.is_generated);
}

#[tokio::test]
async fn cefr_endpoints() {
    let (_, app) = app();
    let (status, body) = post_json(app.clone(), "/api/v1/cefr/analyze", json!({ "text": "The economy thrived." })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert!(body["notice"].is_string());

    let (status, body) = post_json(
        app,
        "/api/v1/cefr/highlight",
        json!({
            "text": "Prices soared.",
            "items": [{ "word": "soared", "level": "C1", "meaning": "tăng vọt", "form": "Academic Word" }],
            "selected": ["C1"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["markup"].as_str().unwrap().starts_with("Prices [soared](#cefr-C1"));
    assert!(body["html"].as_str().unwrap().contains("data-level=\"C1\""));
}

#[tokio::test]
async fn grammar_suggestions_fall_back() {
    let (_, app) = app();
    let (status, body) = get_json(app, "/api/v1/grammar/suggestions?category=Tenses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0], "Present Simple");
}
