//! Error handling for the shelf HTTP layer

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::response::ApiResponse;

/// Message attached to rejected query strings.
pub const VALIDATION_FAILED: &str = "Validation failed!";

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        errors: Vec<String>,
        message: String,
    },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    /// `message` goes to the client; `cause` is only logged.
    #[error("internal error: {message}")]
    Internal {
        message: String,
        cause: anyhow::Error,
    },
}

impl AppError {
    /// Create a validation error carrying every violation
    pub fn validation(errors: Vec<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors,
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an internal error with a client-facing message
    pub fn internal(message: impl Into<String>, cause: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            cause: cause.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::BadRequest { .. } => "bad_request",
            AppError::NotFound { .. } => "not_found",
            AppError::Internal { .. } => "internal_error",
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(vec![rejection.body_text()], VALIDATION_FAILED)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();
        let error_code = self.code();

        match &self {
            AppError::Internal { cause, .. } => tracing::error!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                cause = %format!("{:#}", cause),
                "Request error"
            ),
            _ => tracing::warn!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                "Request rejected"
            ),
        }

        let body = match self {
            AppError::Validation { errors, message } => {
                ApiResponse::<()>::failure(message).with_errors(errors)
            }
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Internal { message, .. } => ApiResponse::<()>::failure(message),
        };

        (status, Json(body)).into_response()
    }
}
