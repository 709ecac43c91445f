//! Session token types and the token service port.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::user::UserSnapshot;
use crate::value_objects::RawToken;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Purpose of a token, carried in its `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access and refresh tokens issued together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Verified contents of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user: UserSnapshot,
    pub kind: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Stateless token issuance and verification.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenService: Send + Sync {
    fn generate_token_pair(&self, user: &UserSnapshot) -> DomainResult<TokenPair>;

    /// Verify signature, expiry, and that the token is an access token.
    fn validate_access_token(&self, token: &RawToken) -> DomainResult<TokenClaims>;

    /// Re-issue a pair from the snapshot embedded in a refresh token.
    fn refresh_tokens(&self, refresh_token: &RawToken) -> DomainResult<TokenPair>;
}
