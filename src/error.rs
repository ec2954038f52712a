use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::documents::StorageError;
use crate::db::models::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, json!(errors)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!(msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!(msg)),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, json!(e.to_string()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!(msg))
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    async fn response_detail(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["detail"].clone()
    }

    #[test]
    fn validation_returns_422() {
        assert_eq!(
            response_status(AppError::Validation(vec![FieldError::new("email", "bad")])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn bad_request_returns_400() {
        assert_eq!(
            response_status(AppError::BadRequest("oops".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn conflict_returns_409() {
        assert_eq!(
            response_status(AppError::Conflict("User already exists".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn storage_returns_500() {
        assert_eq!(
            response_status(AppError::Storage(StorageError::Unavailable)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn internal_detail_carries_error_text() {
        let detail = response_detail(AppError::Storage(StorageError::Unavailable)).await;
        assert_eq!(detail, "Database not available");
    }

    #[tokio::test]
    async fn validation_detail_lists_fields() {
        let detail = response_detail(AppError::Validation(vec![FieldError::new(
            "email",
            "not a valid email",
        )]))
        .await;
        assert_eq!(detail[0]["field"], "email");
        assert_eq!(detail[0]["message"], "not a valid email");
    }
}
