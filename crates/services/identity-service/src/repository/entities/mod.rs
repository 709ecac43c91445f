//! SeaORM entities.

pub mod event;
pub mod user;
