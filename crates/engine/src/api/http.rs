//! HTTP routes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use emcee_shared::{ChatRequest, ModifierInfo};

use crate::app::App;
use crate::stores::DEFAULT_SESSION;
use crate::use_cases::turn::TurnError;

/// Header selecting the game session; absent, callers share one session.
const SESSION_HEADER: &str = "x-session-id";

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/modifiers", get(list_modifiers))
        .route("/api/chat", post(chat))
}

async fn health() -> &'static str {
    "OK"
}

async fn list_modifiers() -> Json<Vec<ModifierInfo>> {
    Json(emcee_domain::catalog().iter().map(Into::into).collect())
}

/// One conversational turn: the body carries the full message history and
/// the response streams the host's reply as plain-text chunks.
async fn chat(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_SESSION)
        .to_string();

    let stream = app
        .use_cases
        .turn
        .execute(&session_id, request.messages)
        .await?;

    // Once streaming begins the status line is on the wire; a mid-stream
    // abort or failure can only terminate the body.
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response())
}

#[derive(Debug)]
pub enum ApiError {
    /// Client-initiated cancellation, reported distinctly from failure.
    Aborted,
    Internal,
}

impl From<TurnError> for ApiError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::Aborted => ApiError::Aborted,
            // Already logged at the controller boundary; stays opaque here.
            TurnError::Backend(_) => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // 499 is "Client Closed Request"
            ApiError::Aborted => (
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                "Request aborted",
            )
                .into_response(),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::LlmError;

    #[test]
    fn test_aborted_turns_map_to_499() {
        let response = ApiError::from(TurnError::Aborted).into_response();
        assert_eq!(response.status().as_u16(), 499);
    }

    #[test]
    fn test_backend_failures_map_to_500() {
        let err = TurnError::Backend(LlmError::RequestFailed("boom".to_string()));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
