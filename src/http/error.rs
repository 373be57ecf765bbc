//! Request rejection taxonomy.
//!
//! # Responsibilities
//! - Name every way this layer can refuse a request
//! - Render each rejection as the fixed `{"message", "error"}` JSON body
//!
//! # Design Decisions
//! - Expired and tampered tokens collapse into one wire-level rejection
//!   so a caller cannot learn whether a forgery was "close"
//! - Unknown-user and wrong-password logins share one rejection for the
//!   same reason
//! - Nothing here is fatal; every variant is a per-request outcome

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::security::password::StrengthError;

/// Every rejection this layer can produce, with its wire message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Authentication token is missing")]
    MissingCredential,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Admin privileges required")]
    Forbidden,
    #[error("Too many requests")]
    RateLimited,
    #[error("Too many login attempts. Please try again later.")]
    TooManyAttempts,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    WeakPassword(#[from] StrengthError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Resource not found")]
    NotFound,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Stable machine-readable code for the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingCredential => "authorization_required",
            ApiError::InvalidToken => "invalid_token",
            ApiError::Forbidden => "forbidden",
            ApiError::RateLimited => "rate_limit_exceeded",
            ApiError::TooManyAttempts => "too_many_attempts",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::WeakPassword(_) => "weak_password",
            ApiError::BadRequest(_) => "invalid_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::NotFound => "not_found",
            ApiError::Internal => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCredential
            | ApiError::InvalidToken
            | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::RateLimited | ApiError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            ApiError::WeakPassword(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "message": self.to_string(),
            "error": self.code(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses_are_pinned() {
        let cases = [
            (ApiError::MissingCredential, 401, "authorization_required"),
            (ApiError::InvalidToken, 401, "invalid_token"),
            (ApiError::Forbidden, 403, "forbidden"),
            (ApiError::RateLimited, 429, "rate_limit_exceeded"),
            (ApiError::TooManyAttempts, 429, "too_many_attempts"),
            (ApiError::InvalidCredentials, 401, "invalid_credentials"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status().as_u16(), status, "{err:?}");
            assert_eq!(err.code(), code, "{err:?}");
        }
    }

    #[test]
    fn weak_password_carries_the_violated_rule() {
        let err = ApiError::from(StrengthError::MissingDigit);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Password must contain at least one number"
        );
    }
}
