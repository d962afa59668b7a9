//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `settings.static_dir` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = Path::new(&state.settings.static_dir);
    let static_service = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Catalog + sections
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/catalog", get(http::http_catalog))
        .route("/api/v1/sections", get(http::http_list_sections))
        .route("/api/v1/sections/:category", get(http::http_get_section))
        .route("/api/v1/generate", post(http::http_post_generate))
        .route("/api/v1/refine", post(http::http_post_refine))
        .route("/api/v1/reset", post(http::http_post_reset))
        .route("/api/v1/format", post(http::http_post_format))
        .route("/api/v1/export", get(http::http_get_export))
        // Tools
        .route("/api/v1/translate", post(http::http_post_translate))
        .route("/api/v1/translate/vocab", post(http::http_post_translate_vocab))
        .route("/api/v1/cefr/analyze", post(http::http_post_cefr_analyze))
        .route("/api/v1/cefr/highlight", post(http::http_post_cefr_highlight))
        .route("/api/v1/dictionary", post(http::http_post_dictionary))
        // Suggestions
        .route("/api/v1/topics/trending", get(http::http_get_trending))
        .route("/api/v1/topics/suggest", get(http::http_get_topic_suggestions))
        .route("/api/v1/grammar/suggestions", get(http::http_get_grammar_suggestions))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
