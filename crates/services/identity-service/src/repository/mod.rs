//! Repository layer for data access.

pub mod entities;
mod event_store;
mod user_repository;

pub use event_store::{EventStore, StoredEvent, TxEventStore};
pub use user_repository::TxUserRepository;
