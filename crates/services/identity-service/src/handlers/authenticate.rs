//! Resolve an access token to the user it was issued for.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use domain::{DomainResult, RawToken, TokenService, UserSnapshot};

/// Identity carried by a valid access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user: UserSnapshot,
    pub expires_at: DateTime<Utc>,
}

pub struct AuthenticateByTokenHandler {
    tokens: Arc<dyn TokenService>,
}

impl AuthenticateByTokenHandler {
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }

    /// Accepts a bare token or an `Authorization` header value.
    pub fn handle(&self, token: &str) -> DomainResult<AuthenticatedUser> {
        let token = RawToken::from_authorization_header(token)?;
        let claims = self.tokens.validate_access_token(&token)?;

        Ok(AuthenticatedUser {
            user: claims.user,
            expires_at: claims.expires_at,
        })
    }
}
