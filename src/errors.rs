use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        let message = e.to_string();
        match e {
            DomainError::NotFound | DomainError::ProductNotFound => AppError::NotFound(message),
            DomainError::EmptyCart
            | DomainError::InvalidInput(_)
            | DomainError::InvalidStatus(_)
            | DomainError::PaymentVerification(_)
            | DomainError::PaymentNotCompleted(_) => AppError::BadRequest(message),
            DomainError::InvalidTransition { .. } | DomainError::PaymentAlreadyUsed => {
                AppError::Conflict(message)
            }
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::PaymentUnavailable => AppError::ServiceUnavailable(message),
            DomainError::PaymentProvider(msg) => AppError::BadGateway(msg),
            DomainError::Persistence(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // Storage and provider details stay in the logs.
            AppError::Internal(detail) => {
                log::error!("Request failed: {}", detail);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
            AppError::BadGateway(detail) => {
                log::error!("Payment provider failed: {}", detail);
                HttpResponse::BadGateway().json(serde_json::json!({
                    "error": "Failed to create payment order"
                }))
            }
            other => HttpResponse::build(other.status_code()).json(serde_json::json!({
                "error": other.to_string()
            })),
        }
    }
}
