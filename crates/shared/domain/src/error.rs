//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (HTTP, gRPC, database).
//! Callers classify them through [`DomainError::kind`], never by message.

use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed a validation rule
    #[error("invalid {field}: {rule}")]
    InvalidInput { field: String, rule: String },

    /// Uniqueness violated for the named field
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Unknown email and wrong password are deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token is malformed, tampered with, or signed with another algorithm
    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongTokenType { expected: String, actual: String },

    /// Password hashing failed
    #[error("Hashing error: {0}")]
    Hashing(String),

    /// Storage, serialization, or timeout failure
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    /// A unit of work was begun while another one is still open
    #[error("Transaction already open")]
    TransactionAlreadyOpen,

    /// The user was committed but tokens could not be issued
    #[error("User {user_id} registered but token issuance failed: {reason}")]
    TokenIssuanceAfterCommit { user_id: Uuid, reason: String },
}

/// Stable classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    AlreadyExists,
    InvalidCredentials,
    TokenInvalid,
    TokenExpired,
    WrongTokenType,
    InfrastructureFailure,
    TransactionAlreadyOpen,
    TokenIssuanceAfterCommit,
}

impl DomainError {
    /// Create an invalid input error
    pub fn invalid_input(field: impl Into<String>, rule: impl Into<String>) -> Self {
        DomainError::InvalidInput {
            field: field.into(),
            rule: rule.into(),
        }
    }

    /// Create a uniqueness conflict error
    pub fn already_exists(field: impl Into<String>) -> Self {
        DomainError::AlreadyExists(field.into())
    }

    pub fn token_invalid(msg: impl Into<String>) -> Self {
        DomainError::TokenInvalid(msg.into())
    }

    pub fn wrong_token_type(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        DomainError::WrongTokenType {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn hashing(msg: impl Into<String>) -> Self {
        DomainError::Hashing(msg.into())
    }

    /// Create an infrastructure error
    pub fn infrastructure(msg: impl Into<String>) -> Self {
        DomainError::Infrastructure(msg.into())
    }

    /// Classify this error.
    ///
    /// Hashing failures are infrastructure failures: the input was acceptable
    /// but a capability broke.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidInput { .. } => ErrorKind::InvalidInput,
            DomainError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            DomainError::InvalidCredentials => ErrorKind::InvalidCredentials,
            DomainError::TokenInvalid(_) => ErrorKind::TokenInvalid,
            DomainError::TokenExpired => ErrorKind::TokenExpired,
            DomainError::WrongTokenType { .. } => ErrorKind::WrongTokenType,
            DomainError::Hashing(_) | DomainError::Infrastructure(_) => {
                ErrorKind::InfrastructureFailure
            }
            DomainError::TransactionAlreadyOpen => ErrorKind::TransactionAlreadyOpen,
            DomainError::TokenIssuanceAfterCommit { .. } => ErrorKind::TokenIssuanceAfterCommit,
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Infrastructure(format!("serialization: {}", err))
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
