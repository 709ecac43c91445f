//! Registration handler tests against in-memory SQLite.

mod support;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use mockall::predicate;
use serde_json::json;

use domain::testing::{FakeHasher, FixedClock};
use domain::{
    Clock, DomainError, DomainResult, Email, ErrorKind, MockEventPublisher, MockTokenService,
    RawToken, Repositories, TokenService, TransactionManager, UserRepository, UserSnapshot,
};
use identity_service::handlers::RegisterUserHandler;
use identity_service::infra::UnitOfWork;
use sea_orm::DatabaseConnection;
use support::{register_cmd, user_count, TestApp};

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::new().await;
    let handler = app.register_handler();

    let result = handler
        .handle(register_cmd(" Alice@Example.com ", "+15551234567"))
        .await
        .unwrap();

    assert_eq!(result.user.email, "alice@example.com");
    assert_eq!(result.user.phone, "+15551234567");
    assert_eq!(result.user.name, "Alice");
    assert_eq!(result.user.created_at, app.clock.now());
    assert_eq!(result.tokens.token_type, "Bearer");
    assert_eq!(result.tokens.expires_in, 900);

    let claims = app
        .tokens
        .validate_access_token(&RawToken::new(&result.tokens.access_token).unwrap())
        .unwrap();
    assert_eq!(claims.user, result.user);

    assert_eq!(app.user_count().await, 1);
    let events = app.events.find_by_aggregate(result.user.user_id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "UserRegistered");
    assert_eq!(
        events[0].payload,
        json!({ "email": "alice@example.com", "phone": "+15551234567" })
    );
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::new().await;
    let handler = app.register_handler();

    handler
        .handle(register_cmd("alice@example.com", "+15551234567"))
        .await
        .unwrap();
    let err = handler
        .handle(register_cmd("ALICE@example.com", "+15559999999"))
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::already_exists("email"));
    assert_eq!(app.user_count().await, 1);
    assert_eq!(app.event_count().await, 1);
}

#[tokio::test]
async fn test_register_duplicate_phone() {
    let app = TestApp::new().await;
    let handler = app.register_handler();

    handler
        .handle(register_cmd("alice@example.com", "+15551234567"))
        .await
        .unwrap();
    let err = handler
        .handle(register_cmd("bob@example.com", "+15551234567"))
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::already_exists("phone"));
}

#[tokio::test]
async fn test_concurrent_duplicate_email_single_winner() {
    let app = TestApp::new().await;
    let handler = app.register_handler();

    let (first, second) = tokio::join!(
        handler.handle(register_cmd("race@example.com", "+15550000001")),
        handler.handle(register_cmd("race@example.com", "+15550000002")),
    );

    let outcomes = [first, second];
    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let failure = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(failure, &DomainError::already_exists("email"));
    assert_eq!(app.user_count().await, 1);
}

#[tokio::test]
async fn test_register_invalid_input_writes_nothing() {
    let app = TestApp::new().await;
    let handler = app.register_handler();

    let err = handler
        .handle(register_cmd("not-an-email", "+15551234567"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = handler
        .handle(register_cmd("alice@example.com", "5551234567"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let mut cmd = register_cmd("alice@example.com", "+15551234567");
    cmd.password = "short".to_string();
    let err = handler.handle(cmd).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput { ref field, .. } if field == "password"));

    assert_eq!(app.user_count().await, 0);
    assert_eq!(app.event_count().await, 0);
}

#[tokio::test]
async fn test_token_failure_after_commit_keeps_user() {
    let app = TestApp::new().await;

    let mut tokens = MockTokenService::new();
    tokens
        .expect_generate_token_pair()
        .with(predicate::function(|user: &UserSnapshot| {
            user.email == "alice@example.com"
        }))
        .times(1)
        .returning(|_| Err(DomainError::infrastructure("signing key unavailable")));
    let handler = app.register_handler_with_tokens(Arc::new(tokens));

    let err = handler
        .handle(register_cmd("alice@example.com", "+15551234567"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TokenIssuanceAfterCommit);
    assert_eq!(app.user_count().await, 1);

    // The account exists, so a retry is a conflict rather than a second user.
    let retry = app
        .register_handler()
        .handle(register_cmd("alice@example.com", "+15551234567"))
        .await
        .unwrap_err();
    assert_eq!(retry, DomainError::already_exists("email"));
}

/// Real user repository, event publisher that always fails.
struct FailingPublishTransactions {
    db: DatabaseConnection,
}

#[async_trait]
impl TransactionManager for FailingPublishTransactions {
    async fn run_in_transaction<F, T>(&self, f: F) -> DomainResult<T>
    where
        F: for<'a> FnOnce(Repositories<'a>) -> BoxFuture<'a, DomainResult<T>> + Send,
        T: Send,
    {
        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .returning(|_| Err(DomainError::infrastructure("outbox write failed")));

        let mut uow = UnitOfWork::new(self.db.clone());
        uow.begin().await?;
        let result = {
            let users = uow.users()?;
            f(Repositories {
                users: &users,
                events: &publisher,
            })
            .await
        };

        match result {
            Ok(value) => {
                uow.commit().await?;
                Ok(value)
            }
            Err(err) => {
                uow.rollback().await?;
                Err(err)
            }
        }
    }
}

#[tokio::test]
async fn test_publish_failure_rolls_back_user() {
    let app = TestApp::new().await;
    let handler = RegisterUserHandler::new(
        Arc::new(FailingPublishTransactions { db: app.db.clone() }),
        Arc::new(FakeHasher),
        Arc::new(FixedClock::default()),
        app.tokens.clone(),
    );

    let err = handler
        .handle(register_cmd("alice@example.com", "+15551234567"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InfrastructureFailure);
    assert_eq!(user_count(&app.db).await, 0);

    let mut uow = UnitOfWork::new(app.db.clone());
    uow.begin().await.unwrap();
    let exists = uow
        .users()
        .unwrap()
        .email_exists(&Email::new("alice@example.com").unwrap())
        .await
        .unwrap();
    uow.rollback().await.unwrap();
    assert!(!exists);
}
