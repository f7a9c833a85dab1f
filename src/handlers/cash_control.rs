use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::errors::ApiError;
use crate::handlers::common::success_response;
use crate::models::CashControl;
use crate::AppState;

/// Wholesale register record; the category comes from the path.
#[derive(Debug, Deserialize)]
pub struct CashControlBody {
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub initial_cash: f64,
    #[serde(default)]
    pub current_balance: f64,
    #[serde(default)]
    pub today_sales: f64,
    #[serde(default)]
    pub last_opened: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_closed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub observations: Option<String>,
}

async fn get_cash_control(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cash_control = state.storage.cash_control(&category).await?;
    Ok(success_response(json!({
        "success": true,
        "cashControl": cash_control,
    })))
}

async fn set_cash_control(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(payload): Json<CashControlBody>,
) -> Result<impl IntoResponse, ApiError> {
    let record = CashControl {
        category: category.clone(),
        is_open: payload.is_open,
        initial_cash: payload.initial_cash,
        current_balance: payload.current_balance,
        today_sales: payload.today_sales,
        last_opened: payload.last_opened,
        last_closed: payload.last_closed,
        observations: payload.observations,
    };

    state.storage.put_cash_control(&category, &record).await?;

    Ok(success_response(json!({
        "success": true,
        "message": "Controle de caixa atualizado com sucesso",
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cash-control/:category", get(get_cash_control))
        .route("/cash-control/:category", post(set_cash_control))
}
