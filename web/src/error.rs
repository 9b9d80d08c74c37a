//! HTTP error responses.
//!
//! Handlers return `Result<_, AppError>`; [`VibeError`] converts with `?` and
//! every failure renders as `{ "code": ..., "message": ... }`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use vibe_core::VibeError;

/// A failed request: status, stable code and client-facing message.
///
/// 5xx errors keep the underlying [`VibeError`] for the log and show the
/// client a generic message.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: &'static str,
    source: Option<VibeError>,
}

impl AppError {
    /// Error with an explicit status and code.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// 400, code `BAD_REQUEST`.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST")
    }

    /// 401, code `UNAUTHORIZED`.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED")
    }

    /// 403, code `FORBIDDEN`.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into(), "FORBIDDEN")
    }

    /// 500, code `INTERNAL_SERVER_ERROR`.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        Self::new(status, message.into(), "INTERNAL_SERVER_ERROR")
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[derive(Serialize)]
struct Body {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            let detail = self
                .source
                .as_ref()
                .map_or_else(|| self.message.clone(), ToString::to_string);
            tracing::error!(status = %self.status, code = self.code, %detail, "request failed");
        }

        let body = Body {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<VibeError> for AppError {
    fn from(err: VibeError) -> Self {
        let (status, code) = match &err {
            VibeError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            VibeError::Conflict(_) => (StatusCode::BAD_REQUEST, "CONFLICT"),
            VibeError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            VibeError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            VibeError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            VibeError::Storage(_) | VibeError::Notification(_) => {
                return Self {
                    source: Some(err),
                    ..Self::internal("An internal error occurred")
                };
            }
        };
        Self::new(status, err.to_string(), code)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            rejection.status(),
            rejection.body_text(),
            "VALIDATION_ERROR",
        )
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text(), "BAD_REQUEST")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_not_found() {
        let err = AppError::from(VibeError::not_found("Event", "123"));
        assert_eq!(err.to_string(), "[NOT_FOUND] Event with id 123 not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_is_bad_request() {
        let err = AppError::from(VibeError::conflict("This email already exists"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "CONFLICT");
    }

    #[test]
    fn test_validation() {
        let err = AppError::from(VibeError::validation("Email is required"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_storage_detail_is_redacted() {
        let err = AppError::from(VibeError::Storage("connection refused".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
