//! Domain event outbox: transactional writer, standalone writer, and read side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::entities::event::{self, ActiveModel, Entity as EventEntity};
use super::user_repository::map_db_err;
use domain::{DomainEvent, DomainResult, EventPublisher};

/// Outbox row as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredEvent {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<event::Model> for StoredEvent {
    type Error = domain::DomainError;

    fn try_from(model: event::Model) -> DomainResult<Self> {
        Ok(Self {
            id: model.id,
            aggregate_id: model.aggregate_id,
            event_type: model.event_type,
            payload: serde_json::from_str(&model.payload)?,
            created_at: model.created_at,
        })
    }
}

async fn insert_events<C: ConnectionTrait>(conn: &C, events: &[DomainEvent]) -> DomainResult<()> {
    if events.is_empty() {
        return Ok(());
    }

    EventEntity::insert_many(events.iter().map(ActiveModel::from))
        .exec_without_returning(conn)
        .await
        .map_err(map_db_err)?;
    Ok(())
}

/// Writes events inside the caller's transaction.
pub struct TxEventStore<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxEventStore<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl EventPublisher for TxEventStore<'_> {
    async fn publish(&self, events: &[DomainEvent]) -> DomainResult<()> {
        insert_events(self.txn, events).await
    }
}

/// Connection-level event store.
///
/// Each `publish` call commits its batch in a transaction of its own; used by
/// the background writers, which run outside any request transaction.
#[derive(Clone)]
pub struct EventStore {
    db: DatabaseConnection,
}

impl EventStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Events of one aggregate, oldest first, in write order within a timestamp.
    pub async fn find_by_aggregate(&self, aggregate_id: Uuid) -> DomainResult<Vec<StoredEvent>> {
        let models = EventEntity::find()
            .filter(event::Column::AggregateId.eq(aggregate_id))
            .order_by_asc(event::Column::CreatedAt)
            .order_by_asc(event::Column::Sequence)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        models.into_iter().map(StoredEvent::try_from).collect()
    }

    /// Events with the given name, oldest first.
    pub async fn find_by_type(&self, event_type: &str) -> DomainResult<Vec<StoredEvent>> {
        let models = EventEntity::find()
            .filter(event::Column::EventType.eq(event_type))
            .order_by_asc(event::Column::CreatedAt)
            .order_by_asc(event::Column::Sequence)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        models.into_iter().map(StoredEvent::try_from).collect()
    }
}

#[async_trait]
impl EventPublisher for EventStore {
    async fn publish(&self, events: &[DomainEvent]) -> DomainResult<()> {
        if events.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await.map_err(map_db_err)?;
        insert_events(&txn, events).await?;
        txn.commit().await.map_err(map_db_err)
    }
}
