//! Error types for web handlers.
//!
//! Bridges [`TicketError`] and HTTP responses. Every error body carries a
//! `success: false` flag and a human-readable message; no stack trace or
//! secret ever leaves the process.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use ticketchain_core::TicketError;

/// Application error type for web handlers.
///
/// Wraps domain errors into HTTP-friendly responses via Axum's
/// `IntoResponse`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    /// For missing-field validation errors: the full required-field list.
    required: Option<Vec<&'static str>>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            required: None,
        }
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into())
    }

    /// Create a 400 listing the fields a request body must carry.
    #[must_use]
    pub fn missing_fields(required: Vec<&'static str>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Missing required fields".to_string(),
            required: Some(required),
        }
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into())
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<Vec<&'static str>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                message = %self.message,
                "request failed"
            );
        }

        let body = ErrorResponse {
            success: false,
            error: self.message,
            required: self.required,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Map lifecycle errors onto status codes: validation and lifecycle
/// conflicts to 400, missing records to 404, gateway problems to 500.
impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::Validation(_)
            | TicketError::SoldOut
            | TicketError::DuplicatePurchase
            | TicketError::AlreadyUsed
            | TicketError::Burned => Self::bad_request(err.to_string()),
            TicketError::NotFound(message) => Self::not_found(message),
            TicketError::ServiceUnavailable(message) => Self::internal(message),
            TicketError::Chain(chain) => Self::internal(chain.to_string()),
            TicketError::Store(message) => {
                tracing::error!(error = %message, "ledger store failure");
                Self::internal("An internal error occurred. Please try again.")
            }
        }
    }
}
