//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{AggregateRoot, Email, Phone, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub phone: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain aggregate
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User::restore(
            model.id,
            Email::from_db(model.email),
            Phone::from_db(model.phone),
            model.name,
            model.password_hash,
            model.created_at,
            model.updated_at,
        )
    }
}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            id: Set(user.id()),
            email: Set(user.email().to_string()),
            phone: Set(user.phone().to_string()),
            name: Set(user.name().to_string()),
            password_hash: Set(user.password_hash().unwrap_or_default().to_string()),
            created_at: Set(user.created_at()),
            updated_at: Set(user.updated_at()),
        }
    }
}
