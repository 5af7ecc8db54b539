use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use vinod::models::transcript::Transcript;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
    /// Transcript returned by the previous exchange, sent back verbatim
    #[serde(default)]
    history: Option<Transcript>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    text: String,
    history: Transcript,
}

/// A JSON `{"error": ...}` body with a status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected chat body: {}", rejection.body_text());
        ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let message = request
        .message
        .filter(|message| !message.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Message is required"))?;

    let mut history = request.history.unwrap_or_default();
    history
        .validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid history: {e}")))?;

    tracing::info!(turns = history.len(), "Received chat request");

    let text = match state.backend.respond(&mut history, &message).await {
        Ok(text) => text,
        Err(err) => {
            // The history is rolled back, so the client can simply resend
            tracing::error!("Failed to answer chat message: {}", err);
            err.user_message().to_string()
        }
    };

    Ok(Json(ChatResponse { text, history }))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    let chat = post(chat_handler)
        .options(preflight)
        .fallback(method_not_allowed);

    Router::new()
        .route("/chat", chat.clone())
        .route("/api/chat", chat)
        .with_state(state)
}
