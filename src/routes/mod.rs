//! Router assembly: generation endpoints, session API, static files, CORS,
//! and HTTP tracing.

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

/// Build the application router with:
/// - The generation endpoints at their original paths
/// - REST-ish session API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // Generation gateway endpoints (wire-compatible with the original flow)
        .route("/generateFlashcards", post(http::http_generate_flashcards))
        .route("/generateTest", post(http::http_generate_test))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/upload", post(http::http_upload))
        .route("/api/v1/upload/progress", get(http::http_upload_progress))
        .route("/api/v1/flashcards/open", post(http::http_flashcards_open))
        .route("/api/v1/flashcards/current", get(http::http_flashcards_current))
        .route("/api/v1/flashcards/next", post(http::http_flashcards_next))
        .route("/api/v1/flashcards/prev", post(http::http_flashcards_prev))
        .route("/api/v1/flashcards/flip", post(http::http_flashcards_flip))
        .route("/api/v1/flashcards/quiz", post(http::http_flashcards_quiz))
        .route("/api/v1/quiz/open", post(http::http_quiz_open))
        .route("/api/v1/quiz/generate", post(http::http_quiz_generate))
        .route("/api/v1/quiz/state", get(http::http_quiz_state))
        .route("/api/v1/quiz/answer", post(http::http_quiz_answer))
        .route("/api/v1/quiz/next", post(http::http_quiz_next))
        .route("/api/v1/quiz/skip", post(http::http_quiz_skip))
        .route("/api/v1/quiz/retake", post(http::http_quiz_retake))
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
