//! Identity service configuration.

use std::env;
use std::str::FromStr;

use common::{DatabaseConfig, JwtConfig, OutboxConfig};
use domain::{MAX_ACCESS_TOKEN_TTL_MINUTES, MAX_REFRESH_TOKEN_TTL_HOURS, MIN_JWT_SECRET_LENGTH};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("JWT_SECRET must be at least {min} characters (got {actual})")]
    SecretTooShort { min: usize, actual: usize },

    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Identity service configuration.
#[derive(Debug, Clone, Default)]
pub struct IdentityServiceConfig {
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub outbox: OutboxConfig,
}

impl IdentityServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort {
                min: MIN_JWT_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        let jwt_defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret,
            access_ttl_minutes: parse_or(
                &lookup,
                "JWT_ACCESS_TTL_MINUTES",
                jwt_defaults.access_ttl_minutes,
            )?,
            refresh_ttl_hours: parse_or(
                &lookup,
                "JWT_REFRESH_TTL_HOURS",
                jwt_defaults.refresh_ttl_hours,
            )?,
        };
        within(
            "JWT_ACCESS_TTL_MINUTES",
            jwt.access_ttl_minutes,
            MAX_ACCESS_TOKEN_TTL_MINUTES,
        )?;
        within(
            "JWT_REFRESH_TTL_HOURS",
            jwt.refresh_ttl_hours,
            MAX_REFRESH_TOKEN_TTL_HOURS,
        )?;

        let db_defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").unwrap_or(db_defaults.url),
            max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                db_defaults.max_connections,
            )?,
            min_connections: parse_or(
                &lookup,
                "DATABASE_MIN_CONNECTIONS",
                db_defaults.min_connections,
            )?,
            transaction_timeout_secs: match lookup("TRANSACTION_TIMEOUT_SECS") {
                Some(raw) => Some(parse("TRANSACTION_TIMEOUT_SECS", raw)?),
                None => None,
            },
        };

        let outbox_defaults = OutboxConfig::default();
        let outbox = OutboxConfig {
            workers: parse_or(&lookup, "EVENT_WORKERS", outbox_defaults.workers)?,
            queue_capacity: parse_or(
                &lookup,
                "EVENT_QUEUE_CAPACITY",
                outbox_defaults.queue_capacity,
            )?,
        };
        positive("EVENT_WORKERS", outbox.workers as i64)?;
        positive("EVENT_QUEUE_CAPACITY", outbox.queue_capacity as i64)?;

        Ok(Self {
            jwt,
            database,
            outbox,
        })
    }
}

fn parse<T: FromStr>(name: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value: raw })
}

fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => parse(name, raw),
        None => Ok(default),
    }
}

fn positive(name: &'static str, value: i64) -> Result<(), ConfigError> {
    within(name, value, i64::MAX)
}

/// Require `1..=max`.
fn within(name: &'static str, value: i64, max: i64) -> Result<(), ConfigError> {
    if value <= 0 || value > max {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        });
    }
    Ok(())
}
