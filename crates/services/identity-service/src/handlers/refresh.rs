//! Exchange a refresh token for a new pair.

use std::sync::Arc;

use domain::{DomainResult, RawToken, TokenPair, TokenService};

pub struct RefreshTokensHandler {
    tokens: Arc<dyn TokenService>,
}

impl RefreshTokensHandler {
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }

    /// Storage is not consulted; the new pair carries the refresh token's snapshot.
    pub fn handle(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let token = RawToken::new(refresh_token)?;
        self.tokens.refresh_tokens(&token)
    }
}
