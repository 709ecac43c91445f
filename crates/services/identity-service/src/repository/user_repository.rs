//! User repository bound to an open transaction.

use async_trait::async_trait;
use sea_orm::{
    sqlx, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    RuntimeErr, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use domain::{AggregateRoot, DomainError, DomainResult, Email, Phone, User, UserRepository};

/// Transaction-scoped user repository.
///
/// All operations run inside the borrowed transaction.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl UserRepository for TxUserRepository<'_> {
    async fn create(&self, user: &User) -> DomainResult<()> {
        UserEntity::insert(ActiveModel::from(user))
            .exec_without_returning(self.txn)
            .await
            .map_err(map_write_err)?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(User::from))
    }

    async fn get_by_email(&self, email: &Email) -> DomainResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(User::from))
    }

    async fn get_by_phone(&self, phone: &Phone) -> DomainResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Phone.eq(phone.as_str()))
            .one(self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(User::from))
    }

    /// Fails when no row with the user's id exists.
    async fn update(&self, user: &User) -> DomainResult<()> {
        UserEntity::update(ActiveModel::from(user))
            .exec(self.txn)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => {
                    DomainError::infrastructure(format!("user {} not found", user.id()))
                }
                e => map_write_err(e),
            })?;
        Ok(())
    }

    async fn email_exists(&self, email: &Email) -> DomainResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .count(self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }

    async fn phone_exists(&self, phone: &Phone) -> DomainResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Phone.eq(phone.as_str()))
            .count(self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }
}

pub(crate) fn map_db_err(err: DbErr) -> DomainError {
    tracing::error!("Database error: {}", err);
    DomainError::infrastructure(err.to_string())
}

/// Unique violations name the offending column; everything else is infrastructure.
fn map_write_err(err: DbErr) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            DomainError::already_exists(unique_field(&err, &detail))
        }
        _ => map_db_err(err),
    }
}

fn unique_field(err: &DbErr, detail: &str) -> &'static str {
    if let Some(constraint) = violated_constraint(err) {
        return constraint_field(&constraint);
    }
    // SQLite reports no constraint name, only "UNIQUE constraint failed: users.<column>".
    match detail.rsplit_once("users.") {
        Some((_, column)) => column_field(column.trim()),
        None => "user",
    }
}

fn violated_constraint(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(e))) => {
            e.constraint().map(str::to_owned)
        }
        _ => None,
    }
}

/// Postgres names inline unique constraints `<table>_<column>_key`.
fn constraint_field(constraint: &str) -> &'static str {
    constraint
        .strip_prefix("users_")
        .and_then(|rest| rest.strip_suffix("_key"))
        .map(column_field)
        .unwrap_or("user")
}

fn column_field(column: &str) -> &'static str {
    match column {
        "email" => "email",
        "phone" => "phone",
        _ => "user",
    }
}
