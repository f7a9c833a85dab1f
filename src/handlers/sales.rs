use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::errors::ApiError;
use crate::handlers::common::{created_response, parse_period, success_response};
use crate::models::{NewSale, NewSaleItem};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cashier: Option<String>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<NewSaleItem>>,
    #[serde(default)]
    pub change_amount: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Record a sale and fold its total into the category's register balance.
/// The read-modify-write on the register record is serialized behind a
/// per-category lock; there is still no rollback of an already-written sale
/// when the register update fails.
async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateSaleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let missing = payload.category.as_deref().map_or(true, str::is_empty)
        || payload.cashier.as_deref().map_or(true, str::is_empty)
        || payload.total.is_none()
        || payload.payment_method.as_deref().map_or(true, str::is_empty)
        || payload.items.is_none();
    if missing {
        return Err(ApiError::Validation(
            "Dados obrigatórios: category, cashier, total, payment_method, items".into(),
        ));
    }

    let total = payload.total.unwrap_or_default();
    let sale = NewSale {
        category: payload.category.unwrap_or_default(),
        cashier: payload.cashier.unwrap_or_default(),
        total,
        payment_method: payload.payment_method.unwrap_or_default(),
        change_amount: payload.change_amount.unwrap_or(0.0),
        status: payload
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "completed".to_string()),
        observations: payload.observations.unwrap_or_default(),
        items: payload.items.unwrap_or_default(),
    };

    let sale_id = state.storage.create_sale(&sale).await?;

    // Serialize register updates per category so concurrent sales cannot
    // drop each other's contribution to the balance.
    let lock = state.cash_lock(&sale.category);
    let _guard = lock.lock().await;

    let mut cash_control = state.storage.cash_control(&sale.category).await?;
    cash_control.today_sales += total;
    cash_control.current_balance = cash_control.initial_cash + cash_control.today_sales;
    state
        .storage
        .put_cash_control(&sale.category, &cash_control)
        .await?;

    info!(
        sale_id = %sale_id,
        category = %sale.category,
        total,
        "sale created"
    );

    Ok(created_response(json!({
        "success": true,
        "message": "Venda criada com sucesso",
        "saleId": sale_id,
    })))
}

async fn list_sales(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<SalesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = parse_period(query.start_date.as_deref(), query.end_date.as_deref())?;
    let sales = state.storage.list_sales(&category, range).await?;

    Ok(success_response(json!({
        "success": true,
        "sales": sales,
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", post(create_sale))
        .route("/sales/:category", get(list_sales))
}
