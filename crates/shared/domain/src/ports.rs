//! Capabilities and storage ports the domain depends on.
//!
//! Adapters live in the service crates; tests substitute fakes or mockall mocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::error::DomainResult;
use crate::events::DomainEvent;
use crate::user::User;
use crate::value_objects::{Email, Phone};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Source of "now" for timestamps and token expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a raw password. Failures are infrastructure failures.
    fn hash(&self, raw: &str) -> DomainResult<String>;

    /// Compare a raw password with a stored hash.
    fn verify(&self, hash: &str, raw: &str) -> bool;
}

/// User persistence scoped to the enclosing transaction.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A uniqueness violation surfaces as `AlreadyExists(field)`.
    async fn create(&self, user: &User) -> DomainResult<()>;

    async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;

    async fn get_by_email(&self, email: &Email) -> DomainResult<Option<User>>;

    async fn get_by_phone(&self, phone: &Phone) -> DomainResult<Option<User>>;

    /// Persist mutable fields of an existing user.
    async fn update(&self, user: &User) -> DomainResult<()>;

    async fn email_exists(&self, email: &Email) -> DomainResult<bool>;

    async fn phone_exists(&self, phone: &Phone) -> DomainResult<bool>;
}

/// Writes domain events to the outbox.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Persist one row per event, in order.
    async fn publish(&self, events: &[DomainEvent]) -> DomainResult<()>;
}

/// Repositories bound to a single open transaction.
#[derive(Clone, Copy)]
pub struct Repositories<'a> {
    pub users: &'a dyn UserRepository,
    pub events: &'a dyn EventPublisher,
}

/// Runs work atomically.
///
/// Not mockable with mockall because of the generic method; tests use a real
/// unit of work over SQLite or a hand-written manager.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Open a transaction, hand `f` repositories bound to it, and commit iff `f`
    /// returns `Ok`. An error or a panic rolls back; the error is returned and a
    /// panic resumes after rollback.
    async fn run_in_transaction<F, T>(&self, f: F) -> DomainResult<T>
    where
        F: for<'a> FnOnce(Repositories<'a>) -> BoxFuture<'a, DomainResult<T>> + Send,
        T: Send;
}
