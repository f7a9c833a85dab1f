use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::errors::ApiError;
use crate::handlers::common::success_response;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload.username.as_deref().filter(|s| !s.is_empty());
    let password = payload.password.as_deref().filter(|s| !s.is_empty());
    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::Validation(
            "Username e password são obrigatórios".into(),
        ));
    };

    let Some(user) = state.storage.authenticate(username, password).await? else {
        return Err(ApiError::Auth("Usuário ou senha incorretos".into()));
    };

    state.storage.touch_last_login(&user).await?;
    info!(username = %user.username, "user logged in");

    Ok(success_response(json!({
        "success": true,
        "user": {
            "id": user.id,
            "username": user.username,
            "name": user.name,
            "role": user.role,
            "category": user.category,
            "permissions": user.permissions,
        },
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}
