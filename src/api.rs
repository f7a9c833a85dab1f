//! Route table.

use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use serde_json::json;

use crate::{handlers, ingest, AppState};

/// The full REST surface plus the ingest endpoints and the 404 fallback.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth::routes())
        .merge(handlers::users::routes())
        .merge(handlers::cash_control::routes())
        .merge(handlers::sales::routes())
        .merge(handlers::products::routes())
        .merge(handlers::reports::routes())
        .merge(handlers::health::routes())
        .merge(ingest::routes())
        .fallback(not_found)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Endpoint não encontrado",
        })),
    )
}
