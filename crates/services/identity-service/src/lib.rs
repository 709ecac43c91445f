//! Identity Service Library
//!
//! Registers accounts, authenticates logins and issues stateless session
//! tokens. Storage goes through SeaORM; tokens are HS256 JWTs.

pub mod config;
pub mod handlers;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use domain::SystemClock;

use crate::config::{ConfigError, IdentityServiceConfig};
use crate::handlers::{AuthenticateByTokenHandler, RefreshTokensHandler};
use crate::service::JwtTokenService;

/// Validate an access token and print its claims as JSON.
pub fn verify_token(token: &str) -> Result<(), Box<dyn std::error::Error>> {
    let handler = AuthenticateByTokenHandler::new(token_service_from_env()?);
    let authenticated = handler.handle(token)?;
    println!("{}", serde_json::to_string_pretty(&authenticated)?);
    Ok(())
}

/// Exchange a refresh token and print the new pair as JSON.
pub fn refresh_token(token: &str) -> Result<(), Box<dyn std::error::Error>> {
    let handler = RefreshTokensHandler::new(token_service_from_env()?);
    let pair = handler.handle(token)?;
    println!("{}", serde_json::to_string_pretty(&pair)?);
    Ok(())
}

fn token_service_from_env() -> Result<Arc<JwtTokenService>, ConfigError> {
    let config = IdentityServiceConfig::from_env()?;
    Ok(Arc::new(JwtTokenService::new(
        &config.jwt,
        Arc::new(SystemClock),
    )))
}
