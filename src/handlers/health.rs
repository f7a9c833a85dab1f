use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;

use crate::AppState;

/// Process-liveness check. Deliberately does not probe the storage backend;
/// it reports which backend is configured, nothing more.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "API funcionando corretamente",
        "timestamp": Utc::now().to_rfc3339(),
        "database": state.storage.backend_name(),
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
