use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::errors::ApiError;
use crate::handlers::common::{created_response, success_response};
use crate::models::{NewUser, UserRole, UserUpdate};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// Full-replacement body for user updates.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.storage.list_users().await?;
    Ok(success_response(json!({
        "success": true,
        "users": users,
    })))
}

async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let required = [
        payload.username.as_deref(),
        payload.password.as_deref(),
        payload.name.as_deref(),
        payload.role.as_deref(),
    ];
    if required.iter().any(|f| f.map_or(true, str::is_empty)) {
        return Err(ApiError::Validation(
            "Dados obrigatórios: username, password, name, role".into(),
        ));
    }

    let role: UserRole = payload
        .role
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| {
            ApiError::Validation(format!(
                "Role inválida: {}",
                payload.role.as_deref().unwrap_or_default()
            ))
        })?;

    let new_user = NewUser {
        username: payload.username.unwrap_or_default(),
        password: payload.password.unwrap_or_default(),
        name: payload.name.unwrap_or_default(),
        role,
        category: payload.category.unwrap_or_default(),
        permissions: payload.permissions.unwrap_or_default(),
    };

    let user_id = state.storage.create_user(&new_user).await?;
    info!(username = %new_user.username, user_id = %user_id, "user created");

    Ok(created_response(json!({
        "success": true,
        "message": "Usuário criado com sucesso",
        "userId": user_id,
    })))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = UserUpdate {
        username: payload.username,
        password: payload.password,
        name: payload.name,
        role: payload.role,
        category: payload.category,
        permissions: payload.permissions,
        is_active: payload.is_active,
    };

    state.storage.update_user(&id, &update).await?;
    info!(user_id = %id, "user updated");

    Ok(success_response(json!({
        "success": true,
        "message": "Usuário atualizado com sucesso",
    })))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.storage.delete_user(&id).await?;
    info!(user_id = %id, "user deleted");

    Ok(success_response(json!({
        "success": true,
        "message": "Usuário deletado com sucesso",
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/:id", put(update_user))
        .route("/users/:id", delete(delete_user))
}
