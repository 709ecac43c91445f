//! JWT token service.
//!
//! Tokens are HS256-signed and self-contained: the claims carry a snapshot of
//! the user taken at issue time, so validation and refresh never touch storage.
//! Expiry is judged against the injected [`Clock`], not the system time.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::JwtConfig;
use domain::{
    Clock, DomainError, DomainResult, RawToken, TokenClaims, TokenKind, TokenPair, TokenService,
    UserSnapshot, TOKEN_TYPE_BEARER,
};

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    user_id: Uuid,
    email: String,
    name: String,
    phone: String,
    created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    kind: TokenKind,
    iat: i64,
    nbf: i64,
    exp: i64,
}

impl Claims {
    fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            user_id: self.user_id,
            email: self.email.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            created_at: self.created_at,
        }
    }
}

/// HS256 implementation of [`TokenService`].
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(config: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        let secret = config.secret.as_bytes();

        // Only HS256 is accepted; expiry is checked against the clock below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl_secs: config.access_ttl_secs(),
            refresh_ttl_secs: config.refresh_ttl_secs(),
            clock,
        }
    }

    fn sign(&self, user: &UserSnapshot, kind: TokenKind, now: DateTime<Utc>) -> DomainResult<String> {
        let ttl_secs = match kind {
            TokenKind::Access => self.access_ttl_secs,
            TokenKind::Refresh => self.refresh_ttl_secs,
        };
        let expires_at = TimeDelta::try_seconds(ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                DomainError::infrastructure(format!(
                    "{} token lifetime of {}s is out of range",
                    kind.as_str(),
                    ttl_secs
                ))
            })?;

        let claims = Claims {
            sub: user.user_id.to_string(),
            user_id: user.user_id,
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            created_at: user.created_at,
            kind,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::infrastructure(format!("token signing failed: {}", e)))
    }

    /// Verify signature and expiry, then require the expected token type.
    fn verify(&self, token: &RawToken, expected: TokenKind) -> DomainResult<Claims> {
        let claims = decode::<Claims>(token.as_str(), &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => DomainError::TokenExpired,
                _ => DomainError::token_invalid(e.to_string()),
            })?
            .claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(DomainError::TokenExpired);
        }

        if claims.kind != expected {
            return Err(DomainError::wrong_token_type(
                expected.as_str(),
                claims.kind.as_str(),
            ));
        }

        Ok(claims)
    }
}

impl TokenService for JwtTokenService {
    fn generate_token_pair(&self, user: &UserSnapshot) -> DomainResult<TokenPair> {
        let now = self.clock.now();

        Ok(TokenPair {
            access_token: self.sign(user, TokenKind::Access, now)?,
            refresh_token: self.sign(user, TokenKind::Refresh, now)?,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.access_ttl_secs,
        })
    }

    fn validate_access_token(&self, token: &RawToken) -> DomainResult<TokenClaims> {
        let claims = self.verify(token, TokenKind::Access)?;
        let issued_at = DateTime::from_timestamp(claims.iat, 0)
            .ok_or_else(|| DomainError::token_invalid("iat out of range"))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| DomainError::token_invalid("exp out of range"))?;

        Ok(TokenClaims {
            user: claims.snapshot(),
            kind: claims.kind,
            issued_at,
            expires_at,
        })
    }

    /// The new pair carries the snapshot from the refresh token unchanged;
    /// profile edits made since then are not reflected.
    fn refresh_tokens(&self, refresh_token: &RawToken) -> DomainResult<TokenPair> {
        let claims = self.verify(refresh_token, TokenKind::Refresh)?;
        self.generate_token_pair(&claims.snapshot())
    }
}
