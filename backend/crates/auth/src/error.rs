//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, conversions, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// A presented secret did not check out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("Invalid password")]
    InvalidPassword,

    #[error("Invalid or expired token")]
    InvalidToken,
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or rejected input
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Email already registered
    #[error("Email is already registered")]
    EmailTaken,

    /// Account no longer pending activation
    #[error("Account is already activated")]
    AlreadyActivated,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Middleware denial: no usable credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Middleware denial: no held role permits the request
    #[error("Forbidden")]
    Forbidden,

    /// A backing service (session store, database) is unreachable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Credential(_) | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::EmailTaken | AuthError::AlreadyActivated => ErrorKind::Conflict,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(e) => conversions::sqlx_error_kind(e),
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side failures keep their detail out of the response body.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        match self {
            AuthError::Database(_) | AuthError::Internal(_) | AuthError::ServiceUnavailable(_) => {
                let app = AppError::new(kind, kind.as_str());
                if kind.is_retryable() {
                    app.with_action("Retry the request later")
                } else {
                    app
                }
            }
            _ => AppError::new(kind, self.to_string()),
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::ServiceUnavailable(msg) => {
                tracing::error!(message = %msg, "Auth backend unavailable");
            }
            AuthError::Credential(e) => {
                tracing::warn!(error = %e, "Credential check failed");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::from(CredentialError::InvalidPassword).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::from(CredentialError::InvalidToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::AlreadyActivated.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::ServiceUnavailable("redis".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_errors_are_classified() {
        assert_eq!(
            AuthError::Database(sqlx::Error::PoolTimedOut).kind(),
            ErrorKind::ServiceUnavailable
        );
        assert_eq!(
            AuthError::Database(sqlx::Error::RowNotFound).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let app = AuthError::Internal("stored hash is garbage".into()).to_app_error();
        assert!(!app.message().contains("garbage"));

        let app = AuthError::ServiceUnavailable("10.0.0.3:6379 refused".into()).to_app_error();
        assert!(!app.message().contains("6379"));
    }
}
