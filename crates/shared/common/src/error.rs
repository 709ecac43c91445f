//! Unified error handling for HTTP and gRPC.
//!
//! Adapters turn a [`DomainError`] into an [`AppError`], which can then become:
//! - Axum HTTP responses
//! - Tonic gRPC status codes
//!
//! Classification goes through [`DomainError::kind`], never through messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, ErrorKind};
use serde::Serialize;
use thiserror::Error;
use tonic::Status;
use uuid::Uuid;

/// Application error types with support for both HTTP and gRPC.
#[derive(Error, Debug)]
pub enum AppError {
    // Input
    #[error("{0}")]
    Validation(String),

    #[error("{0} already exists")]
    Conflict(String),

    // Authentication
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    // The account exists; the client should log in instead of registering again
    #[error("Registered, but tokens could not be issued")]
    RegisteredWithoutTokens { user_id: Uuid, reason: String },

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken(_) => "INVALID_TOKEN",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::RegisteredWithoutTokens { .. } => "REGISTERED_WITHOUT_TOKENS",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken(_) | AppError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::RegisteredWithoutTokens { .. } => StatusCode::ACCEPTED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidToken(reason) => {
                tracing::debug!("Token rejected: {}", reason);
                "Invalid or expired token".to_string()
            }
            AppError::RegisteredWithoutTokens { user_id, reason } => {
                tracing::error!(user_id = %user_id, "Token issuance failed after commit: {}", reason);
                "Account created; please log in".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// gRPC Status (Tonic)
// =============================================================================

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        let code = match &err {
            AppError::Validation(_) => tonic::Code::InvalidArgument,
            AppError::Conflict(_) => tonic::Code::AlreadyExists,
            AppError::InvalidCredentials | AppError::InvalidToken(_) | AppError::TokenExpired => {
                tonic::Code::Unauthenticated
            }
            AppError::RegisteredWithoutTokens { .. } => tonic::Code::Unavailable,
            AppError::Internal(_) => tonic::Code::Internal,
        };

        Status::new(code, err.user_message())
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err.kind() {
            ErrorKind::InvalidInput => AppError::Validation(err.to_string()),
            ErrorKind::AlreadyExists => match err {
                DomainError::AlreadyExists(field) => AppError::Conflict(field),
                other => AppError::Conflict(other.to_string()),
            },
            ErrorKind::InvalidCredentials => AppError::InvalidCredentials,
            ErrorKind::TokenInvalid | ErrorKind::WrongTokenType => {
                AppError::InvalidToken(err.to_string())
            }
            ErrorKind::TokenExpired => AppError::TokenExpired,
            ErrorKind::TokenIssuanceAfterCommit => match err {
                DomainError::TokenIssuanceAfterCommit { user_id, reason } => {
                    AppError::RegisteredWithoutTokens { user_id, reason }
                }
                other => AppError::Internal(other.to_string()),
            },
            ErrorKind::InfrastructureFailure | ErrorKind::TransactionAlreadyOpen => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_map_to_unauthenticated() {
        let err = AppError::from(DomainError::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let status = Status::from(AppError::from(DomainError::TokenExpired));
        assert_eq!(status.code(), tonic::Code::Unauthenticated);

        let status = Status::from(AppError::from(DomainError::wrong_token_type(
            "access", "refresh",
        )));
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert_eq!(status.message(), "Invalid or expired token");
    }

    #[test]
    fn test_conflict_names_field() {
        let err = AppError::from(DomainError::already_exists("email"));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "email already exists");
        assert_eq!(Status::from(err).code(), tonic::Code::AlreadyExists);
    }

    #[test]
    fn test_validation_keeps_message() {
        let err = AppError::from(DomainError::invalid_input("name", "must not be empty"));
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.user_message(), "invalid name: must not be empty");
    }

    #[test]
    fn test_infrastructure_details_hidden() {
        let err = AppError::from(DomainError::infrastructure("connection refused at 10.0.0.5"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "An internal error occurred");

        let err = AppError::from(DomainError::hashing("argon2 params"));
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_post_commit_failure_is_not_a_generic_error() {
        let user_id = Uuid::new_v4();
        let err = AppError::from(DomainError::TokenIssuanceAfterCommit {
            user_id,
            reason: "signing failed".into(),
        });
        assert_eq!(err.code(), "REGISTERED_WITHOUT_TOKENS");
        assert!(matches!(err, AppError::RegisteredWithoutTokens { user_id: id, .. } if id == user_id));
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = AppError::from(DomainError::already_exists("phone")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(body["error"]["message"], "phone already exists");
    }
}
