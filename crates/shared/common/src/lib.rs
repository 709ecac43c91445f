//! Common utilities shared by the identity service and its adapters.
//!
//! This crate provides:
//! - Transport-facing error classification for HTTP and gRPC
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult};
