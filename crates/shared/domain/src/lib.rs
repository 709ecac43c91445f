//! Domain layer - identity aggregate, value objects, events and ports.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Storage, hashing, and token signing are reached only through the traits in
//! [`ports`] and [`tokens`].

pub mod aggregate;
pub mod constants;
pub mod error;
pub mod events;
pub mod ports;
pub mod tokens;
pub mod user;
pub mod value_objects;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use aggregate::{AggregateIdentity, AggregateRoot};
pub use constants::*;
pub use error::{DomainError, DomainResult, ErrorKind};
pub use events::{DomainEvent, UserEvent};
pub use ports::{
    Clock, EventPublisher, PasswordHasher, Repositories, SystemClock, TransactionManager,
    UserRepository,
};
pub use tokens::{TokenClaims, TokenKind, TokenPair, TokenService};
pub use user::{User, UserSnapshot};
pub use value_objects::{Email, Phone, RawToken};

#[cfg(any(test, feature = "test-utils"))]
pub use ports::{MockEventPublisher, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use tokens::MockTokenService;
