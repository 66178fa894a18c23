//! HTTP error mapping
//!
//! Every failure leaves the server as `{error, timestamp, status}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use callmeter::DomainError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub status: u16,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Domain(err) => match err {
                DomainError::Validation(_)
                | DomainError::InvalidAmount { .. }
                | DomainError::AgentNotFound { .. }
                | DomainError::AgentInactive { .. }
                | DomainError::NoOwner { .. }
                | DomainError::AmbiguousOwner { .. } => StatusCode::BAD_REQUEST,
                DomainError::NotFound { .. } | DomainError::BalanceMissing { .. } => {
                    StatusCode::NOT_FOUND
                }
                DomainError::AccountBlocked { .. } | DomainError::Conflict(_) => {
                    StatusCode::CONFLICT
                }
                DomainError::Repository(_) | DomainError::ExternalService(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("Internal error: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: message,
            timestamp: chrono::Utc::now(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
