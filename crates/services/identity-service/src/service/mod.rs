//! Service layer - token issuance and background event writes.

mod outbox;
mod token_service;

pub use outbox::{AsyncEventPublisher, Submission};
pub use token_service::JwtTokenService;
