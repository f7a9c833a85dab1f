//! Spreadsheet/CSV ingest pipeline feeding the dashboard statistics
//! document, plus the legacy data endpoints.

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::errors::ApiError;
use crate::AppState;

pub mod parse;
pub mod stats;

pub use parse::{merge_rows, parse_rows, Row, UploadFormat};
pub use stats::{StatsDocument, StatsStore};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .route("/data", get(current_data))
        .route("/update", post(replace_data))
}

/// Receive one spreadsheet or CSV file and merge its rows into the
/// statistics document. Format and size are checked before parsing.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Requisição multipart inválida: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Falha ao ler arquivo enviado: {e}")))?;
            upload = Some((filename, data));
            break;
        }
    }

    let Some((filename, data)) = upload else {
        return Err(ApiError::Validation("Nenhum arquivo enviado".into()));
    };

    let format = UploadFormat::from_filename(&filename)?;

    if data.len() > state.config.max_body_size {
        return Err(ApiError::FileTooLarge(format!(
            "Arquivo excede o tamanho máximo de {}MB",
            state.config.max_body_size / (1024 * 1024)
        )));
    }

    let rows = parse_rows(format, &data)?;
    info!(file = %filename, rows = rows.len(), "processing upload");

    let doc = state
        .stats
        .update_with(|doc| merge_rows(doc, &rows))
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Dados atualizados com sucesso!",
        "data": doc,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// The full statistics document as last persisted.
async fn current_data(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    match state.stats.read().await {
        Some(doc) => Ok(Json(doc)),
        None => Err(ApiError::NotFound("Dados não encontrados".into())),
    }
}

/// Wholesale replacement of the statistics document.
async fn replace_data(
    State(state): State<AppState>,
    Json(doc): Json<StatsDocument>,
) -> Result<impl IntoResponse, ApiError> {
    state.stats.replace(doc).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Dados atualizados com sucesso!",
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
