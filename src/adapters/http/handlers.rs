//! HTTP handlers for the chat endpoints.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::{DialogueError, DialogueManager};

use super::dto::{AskRequest, AskResponse, ErrorResponse, HealthResponse, ResetResponse};
use super::session::SessionIdentity;

/// Shared application state for the chat endpoints.
#[derive(Clone)]
pub struct AppState {
    pub dialogue: Arc<DialogueManager>,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(dialogue: Arc<DialogueManager>) -> Self {
        Self { dialogue }
    }
}

/// POST /ask - Answer a question within the caller's session.
///
/// Mints a session cookie on first contact.
///
/// # Errors
/// - 400 Bad Request: empty question
/// - 500 Internal Server Error: persistence failure
pub async fn ask(
    State(state): State<AppState>,
    session: SessionIdentity,
    Json(body): Json<AskRequest>,
) -> Result<Response, ApiError> {
    let answer = state
        .dialogue
        .handle_question(&body.question, &session.session_id)
        .await?;

    let mut response = (StatusCode::OK, Json(AskResponse { answer })).into_response();
    session.apply_cookie(&mut response);
    Ok(response)
}

/// POST /reset - Clear the caller's chat history (profile retained).
pub async fn reset(
    State(state): State<AppState>,
    session: SessionIdentity,
) -> Result<Response, ApiError> {
    let message = state.dialogue.reset_session(&session.session_id).await?;

    let mut response = (StatusCode::OK, Json(ResetResponse { message })).into_response();
    session.apply_cookie(&mut response);
    Ok(response)
}

/// GET /health - Liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// API-level errors for the chat endpoints.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<DialogueError> for ApiError {
    fn from(err: DialogueError) -> Self {
        match err {
            DialogueError::EmptyQuestion => ApiError::BadRequest(err.to_string()),
            DialogueError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg)),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal("An internal error occurred"),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}
