// HTTP API
// axum router: JSON in, JSON out, CORS open to any origin

pub mod error;
pub mod handlers;

pub use error::ApiError;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::providers::CompletionService;

/// Shared, read-only handler state.
#[derive(Clone, Default)]
pub struct AppState {
    pub completer: Option<Arc<dyn CompletionService>>,
}

impl AppState {
    pub fn new(completer: Option<Arc<dyn CompletionService>>) -> Self {
        Self { completer }
    }

    pub fn completer(&self) -> Option<&dyn CompletionService> {
        self.completer.as_deref()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/detect", post(handlers::detect))
        .route("/api/paraphrase", post(handlers::paraphrase_text))
        .route("/api/grammar", post(handlers::grammar))
        .route("/api/summarize", post(handlers::summarize_text))
        .route("/api/plagiarism", post(handlers::plagiarism))
        .route("/api/humanize", post(handlers::humanize_text))
        .route("/api/citation", post(handlers::citation))
        .route("/api/translate", post(handlers::translate_text))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
