use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::storage::StorageError;

/// Errors surfaced at the HTTP boundary.
///
/// Storage faults are genericized before reaching the caller; the underlying
/// cause is logged server-side only.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    FileTooLarge(String),

    #[error("{0}")]
    Processing(String),
}

impl ApiError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::DuplicateUsername) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::UnsupportedFormat(_) | Self::FileTooLarge(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message suitable for the response body. Backend faults collapse to a
    /// generic message so no driver detail leaks to the caller.
    pub fn response_message(&self) -> String {
        match self {
            Self::Storage(StorageError::DuplicateUsername) => "Username já existe".to_string(),
            Self::Storage(_) => "Erro interno do servidor".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Storage(cause) = &self {
            if !matches!(cause, StorageError::DuplicateUsername) {
                error!(error = %cause, "storage backend failure");
            }
        }

        let status = self.status_code();
        let body = json!({
            "success": false,
            "message": self.response_message(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Auth("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::UnsupportedFormat("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::FileTooLarge("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Storage(StorageError::DuplicateUsername).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Storage(StorageError::Corrupt("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_detail_is_genericized() {
        let err = ApiError::Storage(StorageError::Corrupt("secret detail".into()));
        assert_eq!(err.response_message(), "Erro interno do servidor");

        let err = ApiError::Storage(StorageError::DuplicateUsername);
        assert_eq!(err.response_message(), "Username já existe");

        let err = ApiError::Validation("Dados obrigatórios: name".into());
        assert_eq!(err.response_message(), "Dados obrigatórios: name");
    }

    #[tokio::test]
    async fn response_carries_envelope() {
        let response = ApiError::Auth("Usuário ou senha incorretos".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Usuário ou senha incorretos");
    }
}
