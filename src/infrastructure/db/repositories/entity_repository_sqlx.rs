use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::entity_repository::{EntityRepository, EntityRow, EntitySnapshot};
use crate::domain::attributes::Attributes;
use crate::infrastructure::db::PgPool;

pub struct SqlxEntityRepository {
    pub pool: PgPool,
}

impl SqlxEntityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_entity(r: &sqlx::postgres::PgRow) -> EntityRow {
    let attributes: serde_json::Value = r.get("attributes");
    EntityRow {
        id: r.get("id"),
        owner_id: r.get("owner_id"),
        entity_id: r.get("entity_id"),
        state: r.get("state"),
        attributes: Attributes::new(attributes),
        last_changed: r.try_get("last_changed").ok(),
        last_updated: r.try_get("last_updated").ok(),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl EntityRepository for SqlxEntityRepository {
    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<EntityRow>> {
        let rows = sqlx::query(
            r#"SELECT id, owner_id, entity_id, state, attributes, last_changed, last_updated, created_at
               FROM tracked_entities WHERE owner_id = $1 ORDER BY entity_id"#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_entity).collect())
    }

    async fn insert(
        &self,
        owner_id: Uuid,
        entity_id: &str,
        snapshot: &EntitySnapshot,
    ) -> anyhow::Result<Option<EntityRow>> {
        let row = sqlx::query(
            r#"INSERT INTO tracked_entities (owner_id, entity_id, state, attributes, last_changed, last_updated)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (owner_id, entity_id) DO NOTHING
               RETURNING id, owner_id, entity_id, state, attributes, last_changed, last_updated, created_at"#,
        )
        .bind(owner_id)
        .bind(entity_id)
        .bind(&snapshot.state)
        .bind(snapshot.attributes.as_value())
        .bind(snapshot.last_changed)
        .bind(snapshot.last_updated)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_entity))
    }

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM tracked_entities WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn update_snapshot(
        &self,
        owner_id: Uuid,
        entity_id: &str,
        snapshot: &EntitySnapshot,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE tracked_entities
               SET state = $3, attributes = $4, last_changed = $5, last_updated = $6
               WHERE owner_id = $1 AND entity_id = $2"#,
        )
        .bind(owner_id)
        .bind(entity_id)
        .bind(&snapshot.state)
        .bind(snapshot.attributes.as_value())
        .bind(snapshot.last_changed)
        .bind(snapshot.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}
