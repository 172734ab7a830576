//! Axum routing table for the chat backend.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{ask, health, reset, AppState};

/// Builds the application router.
///
/// Endpoints:
/// - POST /ask - answer a question within the caller's session
/// - POST /reset - clear the caller's chat history
/// - GET /health - liveness probe
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/reset", post(reset))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
