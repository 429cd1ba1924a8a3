use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::attributes::Attributes;

#[derive(Debug, Clone)]
pub struct EntityRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub entity_id: String,
    pub state: String,
    pub attributes: Attributes,
    pub last_changed: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields written when a fresh hub snapshot lands, on track and on refresh.
#[derive(Debug, Clone)]
pub struct EntitySnapshot {
    pub state: String,
    pub attributes: Attributes,
    pub last_changed: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<EntityRow>>;

    /// Returns None when (owner, entity_id) is already tracked.
    async fn insert(
        &self,
        owner_id: Uuid,
        entity_id: &str,
        snapshot: &EntitySnapshot,
    ) -> anyhow::Result<Option<EntityRow>>;

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool>;

    async fn update_snapshot(
        &self,
        owner_id: Uuid,
        entity_id: &str,
        snapshot: &EntitySnapshot,
    ) -> anyhow::Result<bool>;
}
