use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "mode": state.backend.mode().as_str() }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}
