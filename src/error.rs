use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{data::DataError, recipes::form::FieldErrors};

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Confirmation required")]
    ConfirmationRequired,

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Failed to create recipe: {0}")]
    CreateFailed(#[source] anyhow::Error),

    #[error("Failed to delete recipe: {0}")]
    DeleteFailed(#[source] DataError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(fields) => {
                let body = Json(json!({
                    "error": "Please fix the highlighted fields",
                    "fields": fields,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::ConfirmationRequired => (
                StatusCode::BAD_REQUEST,
                "Deleting a recipe requires confirm=true".to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            AppError::EmailTaken => (StatusCode::CONFLICT, self.to_string()),
            AppError::CreateFailed(e) => {
                tracing::error!(error = ?e, "create recipe failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create recipe".to_string(),
                )
            }
            AppError::DeleteFailed(e) => {
                tracing::error!(error = %e, "delete recipe failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to delete recipe".to_string(),
                )
            }
            AppError::Data(e) => {
                tracing::error!(error = %e, "data error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
