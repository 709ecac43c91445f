//! Shared fixtures for identity-service integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use common::{DatabaseConfig, JwtConfig};
use domain::testing::{FakeHasher, FixedClock};
use domain::{PasswordHasher, TokenService};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use identity_service::handlers::{
    AuthenticateByTokenHandler, LoginCommand, LoginHandler, RefreshTokensHandler,
    RegisterUserCommand, RegisterUserHandler,
};
use identity_service::infra::{Database, SeaTransactionManager};
use identity_service::repository::entities::{event, user};
use identity_service::repository::EventStore;
use identity_service::service::JwtTokenService;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// Fresh in-memory SQLite database with the schema applied.
///
/// A single pooled connection keeps the in-memory database alive and
/// serializes concurrent transactions.
pub async fn setup_db() -> DatabaseConnection {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        transaction_timeout_secs: None,
    };
    let db = Database::connect(&config).await.unwrap();
    db.ensure_schema().await.unwrap();
    db.get_connection()
}

pub struct TestApp {
    pub db: DatabaseConnection,
    pub clock: Arc<FixedClock>,
    pub transactions: Arc<SeaTransactionManager>,
    pub tokens: Arc<JwtTokenService>,
    pub events: EventStore,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = setup_db().await;
        let clock = Arc::new(FixedClock::default());
        let tokens = Arc::new(JwtTokenService::new(
            &JwtConfig::new(JWT_SECRET),
            clock.clone(),
        ));

        Self {
            transactions: Arc::new(SeaTransactionManager::new(db.clone())),
            events: EventStore::new(db.clone()),
            db,
            clock,
            tokens,
        }
    }

    pub fn register_handler(&self) -> RegisterUserHandler<SeaTransactionManager> {
        self.register_handler_with_tokens(self.tokens.clone())
    }

    pub fn register_handler_with_tokens(
        &self,
        tokens: Arc<dyn TokenService>,
    ) -> RegisterUserHandler<SeaTransactionManager> {
        RegisterUserHandler::new(
            self.transactions.clone(),
            Arc::new(FakeHasher),
            self.clock.clone(),
            tokens,
        )
    }

    pub fn login_handler(&self) -> LoginHandler<SeaTransactionManager> {
        self.login_handler_with_hasher(Arc::new(FakeHasher))
    }

    pub fn login_handler_with_hasher(
        &self,
        hasher: Arc<dyn PasswordHasher>,
    ) -> LoginHandler<SeaTransactionManager> {
        LoginHandler::new(
            self.transactions.clone(),
            hasher,
            self.clock.clone(),
            self.tokens.clone(),
        )
    }

    pub fn authenticate_handler(&self) -> AuthenticateByTokenHandler {
        AuthenticateByTokenHandler::new(self.tokens.clone())
    }

    pub fn refresh_handler(&self) -> RefreshTokensHandler {
        RefreshTokensHandler::new(self.tokens.clone())
    }

    pub async fn user_count(&self) -> u64 {
        user_count(&self.db).await
    }

    pub async fn event_count(&self) -> u64 {
        event::Entity::find().count(&self.db).await.unwrap()
    }
}

pub async fn user_count(db: &DatabaseConnection) -> u64 {
    user::Entity::find().count(db).await.unwrap()
}

pub fn register_cmd(email: &str, phone: &str) -> RegisterUserCommand {
    RegisterUserCommand {
        email: email.to_string(),
        phone: phone.to_string(),
        name: "Alice".to_string(),
        password: "password123".to_string(),
    }
}

pub fn login_cmd(email: &str, password: &str) -> LoginCommand {
    LoginCommand {
        email: email.to_string(),
        password: password.to_string(),
    }
}
