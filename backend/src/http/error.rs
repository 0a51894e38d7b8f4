//! HTTP error handling and response types.
//!
//! Every failure leaves a handler as an [`AppError`], is logged once when
//! it is rendered, and reaches the client as a JSON [`ApiError`] body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::{ErrorKind, RepositoryError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error, unparsable id or body)
    BadRequest(String),
    /// Email already registered
    Conflict(String),
    /// Server-side failure. Only `message` reaches the client; `cause` is
    /// logged.
    Internal {
        message: String,
        cause: Option<String>,
    },
}

impl AppError {
    /// Map a repository failure. `message` is what the client sees when the
    /// failure is internal.
    pub fn repository(source: RepositoryError, message: &'static str) -> Self {
        match source.kind() {
            ErrorKind::NotFound => AppError::NotFound(source.message().to_string()),
            ErrorKind::Validation => AppError::BadRequest(source.message().to_string()),
            ErrorKind::Conflict => AppError::Conflict(source.message().to_string()),
            _ => AppError::Internal {
                message: message.to_string(),
                cause: Some(source.to_string()),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::NotFound(msg) => ApiError::new("NOT_FOUND", msg),
            AppError::BadRequest(msg) => ApiError::new("BAD_REQUEST", msg),
            AppError::Conflict(msg) => ApiError::new("CONFLICT", msg),
            AppError::Internal { message, cause } => {
                tracing::error!(
                    status = status.as_u16(),
                    cause = cause.as_deref().unwrap_or("unknown"),
                    "{}",
                    message
                );
                ApiError::new("INTERNAL_ERROR", message)
            }
        };

        if !status.is_server_error() {
            tracing::warn!(status = status.as_u16(), "{}", body.error);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserId;

    #[test]
    fn test_repository_errors_map_to_status() {
        let cases = [
            (RepositoryError::not_found("x"), StatusCode::NOT_FOUND),
            (RepositoryError::validation("x"), StatusCode::BAD_REQUEST),
            (RepositoryError::conflict("x"), StatusCode::BAD_REQUEST),
            (
                RepositoryError::connection("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (RepositoryError::query("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (source, expected) in cases {
            let err = AppError::repository(source, "Failed to fetch user");
            assert_eq!(err.status(), expected);
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_error_keeps_cause_for_logging_only() {
        let err = AppError::repository(
            RepositoryError::query("relation \"users\" does not exist"),
            "Failed to fetch users",
        );
        match err {
            AppError::Internal { message, cause } => {
                assert_eq!(message, "Failed to fetch users");
                assert!(cause.unwrap().contains("relation"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_client_errors_use_repository_message() {
        let err = AppError::repository(
            RepositoryError::email_taken("create_user", "a@b.c"),
            "Failed to create user",
        );
        assert!(matches!(err, AppError::Conflict(ref msg) if msg == "Email already exists"));

        let err = AppError::repository(
            RepositoryError::user_not_found("get_user", UserId::new(9)),
            "Failed to fetch user",
        );
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "User not found"));
    }
}
