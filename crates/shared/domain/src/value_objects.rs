//! Validated value objects: email, phone, and raw token strings.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{BEARER_TOKEN_PREFIX, EMAIL_MAX_LENGTH};
use crate::error::{DomainError, DomainResult};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$").expect("email pattern is valid")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{6,14}$").expect("phone pattern is valid"));

/// Normalized email address (trimmed, lower-cased).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn new(raw: &str) -> DomainResult<Self> {
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(DomainError::invalid_input("email", "must not be empty"));
        }
        if normalized.len() > EMAIL_MAX_LENGTH {
            return Err(DomainError::invalid_input(
                "email",
                format!("must be at most {} characters", EMAIL_MAX_LENGTH),
            ));
        }
        if !EMAIL_RE.is_match(&normalized) {
            return Err(DomainError::invalid_input("email", "invalid format"));
        }

        Ok(Self(normalized))
    }

    /// Wrap a value already validated on the way into storage.
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// E.164 phone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    pub fn new(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(DomainError::invalid_input("phone", "must not be empty"));
        }
        if !PHONE_RE.is_match(trimmed) {
            return Err(DomainError::invalid_input(
                "phone",
                "must be E.164: '+' followed by 7 to 15 digits",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque token string as received from a caller.
#[derive(Clone, PartialEq, Eq)]
pub struct RawToken(String);

impl RawToken {
    pub fn new(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_input("token", "must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build from an `Authorization` header value, stripping a `Bearer ` prefix if present.
    pub fn from_authorization_header(header: &str) -> DomainResult<Self> {
        let trimmed = header.trim();
        let token = trimmed.strip_prefix(BEARER_TOKEN_PREFIX).unwrap_or(trimmed);
        Self::new(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawToken([REDACTED])")
    }
}
