//! Error type shared by services and controllers.
//!
//! Every failure leaves the API as the same envelope the success paths use:
//! `{ "success": false, "message": ..., "error": ... }`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field is missing or has an unusable value (400).
    #[error("{0}")]
    Validation(String),

    /// No usable credentials on the request (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not allow the operation (403).
    #[error("{0}")]
    Forbidden(String),

    /// The referenced record does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// The write collides with an existing record (409).
    #[error("{0}")]
    Conflict(String),

    /// The USD/PKR rate source failed or returned an unusable value (503).
    #[error("exchange rate unavailable: {0}")]
    ExchangeRateUnavailable(String),

    #[error("{0}")]
    Database(#[from] mongodb::error::Error),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ExchangeRateUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Self::Database(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "server error");
                json!({ "success": false, "message": "Server error", "error": self.to_string() })
            }
            Self::ExchangeRateUnavailable(_) => {
                tracing::warn!(error = %self, "exchange rate unavailable");
                json!({
                    "success": false,
                    "message": "Exchange rate service is unavailable",
                    "error": self.to_string(),
                })
            }
            other => json!({ "success": false, "message": other.to_string(), "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// A delete that matched nothing is a 404.
pub fn ensure_deleted(deleted_count: u64, not_found: fn() -> ApiError) -> ApiResult<()> {
    if deleted_count == 0 {
        return Err(not_found());
    }
    Ok(())
}

/// True when a write failed on a unique index (E11000).
pub fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    e.to_string().contains("E11000")
}
