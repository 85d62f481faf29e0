use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::compose::ComposeError;
use crate::extract::ExtractError;
use crate::llm_client::FailureClass;
use crate::optimizer::OptimizeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Optimize(err) => match err {
                OptimizeError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                OptimizeError::Provider { class, .. } => {
                    tracing::error!("Provider error: {err}");
                    let code = match class {
                        FailureClass::ModelUnavailable => "MODEL_UNAVAILABLE",
                        c if c.is_retryable() => "PROVIDER_TRANSIENT_ERROR",
                        _ => "PROVIDER_PERMANENT_ERROR",
                    };
                    (StatusCode::BAD_GATEWAY, code, err.to_string())
                }
                OptimizeError::TimedOut(_) => {
                    tracing::error!("Provider timeout: {err}");
                    (StatusCode::GATEWAY_TIMEOUT, "PROVIDER_TIMEOUT", err.to_string())
                }
                OptimizeError::Cancelled => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CANCELLED",
                    err.to_string(),
                ),
            },
            AppError::Extract(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                err.to_string(),
            ),
            AppError::Compose(ComposeError::EmptyInput) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                ComposeError::EmptyInput.to_string(),
            ),
            AppError::Compose(err) => {
                tracing::error!("Compose error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The résumé could not be rendered".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
