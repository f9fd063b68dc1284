use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::database::StoreError;
use crate::services::payment_intent_service::PaymentError;

pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by handlers and the authorization gate.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing authorization token")]
    Unauthenticated,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(#[from] StoreError),
    #[error("Payment intent error: {0}")]
    PaymentIntentFailed(#[from] PaymentError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::PaymentIntentFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal causes stay in the log, clients get a generic message
        let message = match self {
            AppError::Database(e) => {
                log::error!("❌ Database failure: {}", e);
                "Internal server error".to_string()
            }
            AppError::PaymentIntentFailed(e) => {
                log::error!("❌ Failed to create payment intent: {}", e);
                "Failed to create payment intent".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": message
        }))
    }
}
