//! Domain event outbox entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use domain::DomainEvent;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "domain_events")]
pub struct Model {
    /// Insertion order; breaks ties between events stamped in the same instant.
    #[sea_orm(primary_key)]
    pub sequence: i64,
    #[sea_orm(unique)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub aggregate_id: Uuid,
    #[sea_orm(indexed)]
    pub event_type: String,
    #[sea_orm(column_type = "Text")]
    pub payload: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DomainEvent> for ActiveModel {
    fn from(event: &DomainEvent) -> Self {
        ActiveModel {
            sequence: NotSet,
            id: Set(event.id),
            aggregate_id: Set(event.aggregate_id),
            event_type: Set(event.name().to_string()),
            payload: Set(event.payload().to_string()),
            created_at: Set(event.occurred_at),
        }
    }
}
