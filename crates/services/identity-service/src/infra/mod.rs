//! Infrastructure layer - database, transactions and password hashing.

mod db;
mod password;
mod unit_of_work;

pub use db::Database;
pub use password::Argon2Hasher;
pub use unit_of_work::{SeaTransactionManager, UnitOfWork};
