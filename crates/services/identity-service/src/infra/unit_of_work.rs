//! Unit of Work and transaction manager.
//!
//! A [`UnitOfWork`] owns at most one open transaction and hands out
//! repositories bound to it. [`SeaTransactionManager`] drives a unit of work
//! around a closure: commit on `Ok`, rollback on `Err` or panic.
//!
//! Dropping an open unit of work (for example when the caller's future is
//! cancelled) drops the transaction, which rolls it back.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, IsolationLevel,
    TransactionTrait,
};

use crate::repository::{TxEventStore, TxUserRepository};
use domain::{DomainError, DomainResult, Repositories, TransactionManager};

tokio::task_local! {
    static IN_TRANSACTION: ();
}

/// Explicit begin/commit/rollback over a single transaction.
pub struct UnitOfWork {
    db: DatabaseConnection,
    txn: Option<DatabaseTransaction>,
}

impl UnitOfWork {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, txn: None }
    }

    /// Open the transaction. Fails with `TransactionAlreadyOpen` if one is open.
    pub async fn begin(&mut self) -> DomainResult<()> {
        if self.txn.is_some() {
            return Err(DomainError::TransactionAlreadyOpen);
        }

        // SQLite has no per-transaction isolation setting.
        let isolation = match self.db.get_database_backend() {
            DbBackend::Sqlite => None,
            _ => Some(IsolationLevel::ReadCommitted),
        };

        let txn = self
            .db
            .begin_with_config(isolation, None)
            .await
            .map_err(|e| DomainError::infrastructure(format!("begin transaction: {}", e)))?;
        self.txn = Some(txn);
        Ok(())
    }

    pub async fn commit(&mut self) -> DomainResult<()> {
        let txn = self.take_open()?;
        txn.commit()
            .await
            .map_err(|e| DomainError::infrastructure(format!("commit: {}", e)))
    }

    pub async fn rollback(&mut self) -> DomainResult<()> {
        let txn = self.take_open()?;
        txn.rollback()
            .await
            .map_err(|e| DomainError::infrastructure(format!("rollback: {}", e)))
    }

    pub fn is_open(&self) -> bool {
        self.txn.is_some()
    }

    /// The open transaction.
    pub fn transaction(&self) -> DomainResult<&DatabaseTransaction> {
        self.txn
            .as_ref()
            .ok_or_else(|| DomainError::infrastructure("no open transaction"))
    }

    pub fn users(&self) -> DomainResult<TxUserRepository<'_>> {
        Ok(TxUserRepository::new(self.transaction()?))
    }

    pub fn events(&self) -> DomainResult<TxEventStore<'_>> {
        Ok(TxEventStore::new(self.transaction()?))
    }

    fn take_open(&mut self) -> DomainResult<DatabaseTransaction> {
        self.txn
            .take()
            .ok_or_else(|| DomainError::infrastructure("no open transaction"))
    }

    async fn rollback_logged(&mut self) {
        if let Err(rollback_err) = self.rollback().await {
            tracing::error!("Transaction rollback failed: {}", rollback_err);
        }
    }
}

/// [`TransactionManager`] over a SeaORM connection pool.
#[derive(Clone)]
pub struct SeaTransactionManager {
    db: DatabaseConnection,
    timeout: Option<Duration>,
}

impl SeaTransactionManager {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, timeout: None }
    }

    /// Bound every transaction by `timeout`; expiry rolls back.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn execute<F, T>(&self, f: F) -> DomainResult<T>
    where
        F: for<'a> FnOnce(Repositories<'a>) -> BoxFuture<'a, DomainResult<T>> + Send,
        T: Send,
    {
        let mut uow = UnitOfWork::new(self.db.clone());
        uow.begin().await?;

        let outcome = {
            let users = uow.users()?;
            let events = uow.events()?;
            let repos = Repositories {
                users: &users,
                events: &events,
            };

            let work = AssertUnwindSafe(f(repos)).catch_unwind();
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, work).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::warn!(timeout_ms = limit.as_millis() as u64, "Transaction timed out");
                        Ok(Err(DomainError::infrastructure("transaction timed out")))
                    }
                },
                None => work.await,
            }
        };

        match outcome {
            Ok(Ok(value)) => {
                uow.commit().await?;
                Ok(value)
            }
            Ok(Err(err)) => {
                uow.rollback_logged().await;
                Err(err)
            }
            Err(panic) => {
                uow.rollback_logged().await;
                std::panic::resume_unwind(panic)
            }
        }
    }
}

#[async_trait]
impl TransactionManager for SeaTransactionManager {
    async fn run_in_transaction<F, T>(&self, f: F) -> DomainResult<T>
    where
        F: for<'a> FnOnce(Repositories<'a>) -> BoxFuture<'a, DomainResult<T>> + Send,
        T: Send,
    {
        if IN_TRANSACTION.try_with(|_| ()).is_ok() {
            return Err(DomainError::TransactionAlreadyOpen);
        }

        IN_TRANSACTION.scope((), self.execute(f)).await
    }
}
