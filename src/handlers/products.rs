use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::errors::ApiError;
use crate::handlers::common::{created_response, success_response};
use crate::models::{NewProduct, ProductType};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(rename = "type", default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state.storage.list_products().await?;
    Ok(success_response(json!({
        "success": true,
        "products": products,
    })))
}

async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let missing = payload.name.as_deref().map_or(true, str::is_empty)
        || payload.price.is_none()
        || payload.product_type.as_deref().map_or(true, str::is_empty);
    if missing {
        return Err(ApiError::Validation(
            "Dados obrigatórios: name, price, type".into(),
        ));
    }

    let product_type: ProductType = payload
        .product_type
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| {
            ApiError::Validation(format!(
                "Tipo de produto inválido: {}",
                payload.product_type.as_deref().unwrap_or_default()
            ))
        })?;

    let new_product = NewProduct {
        name: payload.name.unwrap_or_default(),
        price: payload.price.unwrap_or_default(),
        product_type,
        description: payload.description.unwrap_or_default(),
    };

    let product_id = state.storage.create_product(&new_product).await?;
    info!(name = %new_product.name, product_id = %product_id, "product created");

    Ok(created_response(json!({
        "success": true,
        "message": "Produto criado com sucesso",
        "productId": product_id,
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products", post(create_product))
}
