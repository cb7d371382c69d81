use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    NotReady(String),
    Internal(String),
    Database(db::DbError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::NotReady(msg) => (StatusCode::CONFLICT, "not_ready", msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            AppError::Database(err) => {
                tracing::error!("Storage error: {:?}", err);
                match err {
                    db::DbError::JobNotFound(id) => (
                        StatusCode::NOT_FOUND,
                        "not_found",
                        format!("Job not found: {}", id),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "storage_error",
                        "Storage error occurred".to_string(),
                    ),
                }
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<db::DbError> for AppError {
    fn from(err: db::DbError) -> Self {
        AppError::Database(err)
    }
}

impl From<consilium_core::CoreError> for AppError {
    fn from(err: consilium_core::CoreError) -> Self {
        match err {
            consilium_core::CoreError::Validation(msg) => AppError::BadRequest(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<orchestrator::OrchestratorError> for AppError {
    fn from(err: orchestrator::OrchestratorError) -> Self {
        match err {
            orchestrator::OrchestratorError::Database(db_err) => AppError::Database(db_err),
            other => AppError::Internal(other.to_string()),
        }
    }
}
