//! Register a new user.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use super::AuthResult;
use domain::{
    AggregateRoot, Clock, DomainError, DomainResult, Email, PasswordHasher, Phone, TokenService,
    TransactionManager, User,
};

#[derive(Clone)]
pub struct RegisterUserCommand {
    pub email: String,
    pub phone: String,
    pub name: String,
    pub password: String,
}

impl fmt::Debug for RegisterUserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserCommand")
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub struct RegisterUserHandler<M> {
    transactions: Arc<M>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenService>,
}

impl<M: TransactionManager> RegisterUserHandler<M> {
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
        }
    }

    /// Persist the user and its events atomically, then issue tokens.
    ///
    /// Once the transaction has committed the user exists; a token failure
    /// after that point is reported as `TokenIssuanceAfterCommit`.
    pub async fn handle(&self, cmd: RegisterUserCommand) -> DomainResult<AuthResult> {
        let email = Email::new(&cmd.email)?;
        let phone = Phone::new(&cmd.phone)?;
        let hasher = Arc::clone(&self.hasher);
        let clock = Arc::clone(&self.clock);

        let mut user = self
            .transactions
            .run_in_transaction(move |repos| {
                Box::pin(async move {
                    if repos.users.email_exists(&email).await? {
                        return Err(DomainError::already_exists("email"));
                    }
                    if repos.users.phone_exists(&phone).await? {
                        return Err(DomainError::already_exists("phone"));
                    }

                    let user = User::register(
                        email,
                        phone,
                        &cmd.name,
                        &cmd.password,
                        hasher.as_ref(),
                        clock.as_ref(),
                    )?;

                    repos.users.create(&user).await?;
                    repos.events.publish(user.pending_events()).await?;

                    Ok(user)
                })
            })
            .await?;

        let published = user.drain_events();
        info!(user_id = %user.id(), events = published.len(), "User registered");

        let snapshot = user.snapshot();
        let tokens = self
            .tokens
            .generate_token_pair(&snapshot)
            .map_err(|e| {
                error!(user_id = %snapshot.user_id, error = %e, "Token issuance failed after commit");
                DomainError::TokenIssuanceAfterCommit {
                    user_id: snapshot.user_id,
                    reason: e.to_string(),
                }
            })?;

        Ok(AuthResult {
            user: snapshot,
            tokens,
        })
    }
}
