//! Authenticate with email and password.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{info, warn};

use super::AuthResult;
use domain::{
    AggregateRoot, Clock, DomainError, DomainResult, Email, PasswordHasher, TokenService,
    TransactionManager,
};

/// Hashed on first use and verified against when the email is unknown, so both
/// failure paths spend comparable time. A failed hash is not cached.
const DECOY_PASSWORD: &str = "decoy-password-never-matches";

#[derive(Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub struct LoginHandler<M> {
    transactions: Arc<M>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenService>,
    decoy_hash: Arc<OnceCell<String>>,
}

impl<M: TransactionManager> LoginHandler<M> {
    pub fn new(
        transactions: Arc<M>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            transactions,
            hasher,
            clock,
            tokens,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn handle(&self, cmd: LoginCommand) -> DomainResult<AuthResult> {
        let email = Email::new(&cmd.email)?;
        let hasher = Arc::clone(&self.hasher);
        let clock = Arc::clone(&self.clock);
        let decoy_hash = Arc::clone(&self.decoy_hash);

        let mut user = self
            .transactions
            .run_in_transaction(move |repos| {
                Box::pin(async move {
                    let Some(mut user) = repos.users.get_by_email(&email).await? else {
                        match decoy_hash.get_or_try_init(|| hasher.hash(DECOY_PASSWORD)) {
                            Ok(decoy) => {
                                hasher.verify(decoy, &cmd.password);
                            }
                            Err(e) => warn!(error = %e, "Decoy password hash unavailable"),
                        }
                        return Err(DomainError::InvalidCredentials);
                    };

                    if !user.verify_password(&cmd.password, hasher.as_ref()) {
                        return Err(DomainError::InvalidCredentials);
                    }

                    user.mark_logged_in(clock.as_ref());
                    repos.events.publish(user.pending_events()).await?;

                    Ok(user)
                })
            })
            .await?;

        user.drain_events();
        info!(user_id = %user.id(), "User logged in");

        let snapshot = user.snapshot();
        let tokens = self.tokens.generate_token_pair(&snapshot)?;

        Ok(AuthResult {
            user: snapshot,
            tokens,
        })
    }
}
