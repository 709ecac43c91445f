//! Command and query handlers.

mod authenticate;
mod login;
mod refresh;
mod register;

use domain::{TokenPair, UserSnapshot};
use serde::Serialize;

pub use authenticate::{AuthenticateByTokenHandler, AuthenticatedUser};
pub use login::{LoginCommand, LoginHandler};
pub use refresh::RefreshTokensHandler;
pub use register::{RegisterUserCommand, RegisterUserHandler};

/// Outcome of a successful register or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResult {
    pub user: UserSnapshot,
    pub tokens: TokenPair,
}
