use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::link_repository::{
    AccessOutcome, LinkRepository, LinkSettings,
};
use crate::domain::links::{AccessMode, LinkDenied, LinkKind, ResolveDecision, ShareLink};
use crate::infrastructure::db::PgPool;

pub struct SqlxLinkRepository {
    pub pool: PgPool,
}

impl SqlxLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LINK_COLUMNS: &str = "id, owner_id, entity_ids, kind, access_mode, access_count, \
     max_access, expires_at, active, password_hash, created_at";

fn row_to_link(r: &sqlx::postgres::PgRow) -> anyhow::Result<ShareLink> {
    let entity_ids: serde_json::Value = r.get("entity_ids");
    let entity_ids: Vec<String> = serde_json::from_value(entity_ids)?;
    let kind: String = r.get("kind");
    let kind = LinkKind::parse(&kind).ok_or_else(|| anyhow::anyhow!("bad link kind: {kind}"))?;
    let access_mode: String = r.get("access_mode");
    let access_mode = AccessMode::parse(&access_mode)
        .ok_or_else(|| anyhow::anyhow!("bad access mode: {access_mode}"))?;
    Ok(ShareLink {
        id: r.get("id"),
        owner_id: r.get("owner_id"),
        entity_ids,
        kind,
        access_mode,
        access_count: r.get("access_count"),
        max_access: r.try_get("max_access").ok(),
        expires_at: r.try_get("expires_at").ok(),
        active: r.get("active"),
        password_hash: r.try_get("password_hash").ok(),
        created_at: r.get("created_at"),
    })
}

#[async_trait]
impl LinkRepository for SqlxLinkRepository {
    async fn create_link(&self, link: &ShareLink) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO share_links
               (id, owner_id, entity_ids, kind, access_mode, access_count,
                max_access, expires_at, active, password_hash, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
        )
        .bind(&link.id)
        .bind(link.owner_id)
        .bind(serde_json::to_value(&link.entity_ids)?)
        .bind(link.kind.as_str())
        .bind(link.access_mode.as_str())
        .bind(link.access_count)
        .bind(link.max_access)
        .bind(link.expires_at)
        .bind(link.active)
        .bind(link.password_hash.as_deref())
        .bind(link.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<ShareLink>> {
        let rows = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM share_links WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_link).collect()
    }

    async fn find(&self, id: &str) -> anyhow::Result<Option<ShareLink>> {
        let row = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM share_links WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_link).transpose()
    }

    async fn find_owned(&self, owner_id: Uuid, id: &str) -> anyhow::Result<Option<ShareLink>> {
        let row = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM share_links WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_link).transpose()
    }

    /// The gate and the increment run in one transaction with the link row
    /// locked, so concurrent resolutions of the same id serialize here. A
    /// deactivating denial (exhausted/expired) commits the one-way flip; a
    /// non-deactivating denial leaves no trace.
    async fn begin_access(
        &self,
        id: &str,
        password: Option<&str>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<AccessOutcome> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM share_links WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let link = match row {
            Some(ref r) => row_to_link(r)?,
            None => return Ok(AccessOutcome::Denied(LinkDenied::NotFound)),
        };

        match link.decide_resolve(now, password) {
            ResolveDecision::Deny { reason, deactivate } => {
                if deactivate {
                    sqlx::query("UPDATE share_links SET active = FALSE WHERE id = $1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                    tx.commit().await?;
                }
                Ok(AccessOutcome::Denied(reason))
            }
            ResolveDecision::Grant => {
                let access_count: i64 = sqlx::query_scalar(
                    "UPDATE share_links SET access_count = access_count + 1 WHERE id = $1 \
                     RETURNING access_count",
                )
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
                tx.commit().await?;
                Ok(AccessOutcome::Granted(ShareLink {
                    access_count,
                    ..link
                }))
            }
        }
    }

    async fn save_settings(
        &self,
        owner_id: Uuid,
        id: &str,
        settings: &LinkSettings,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE share_links
               SET entity_ids = $3, kind = $4, access_mode = $5,
                   max_access = $6, expires_at = $7, password_hash = $8
               WHERE id = $1 AND owner_id = $2 AND active"#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(serde_json::to_value(&settings.entity_ids)?)
        .bind(settings.kind.as_str())
        .bind(settings.access_mode.as_str())
        .bind(settings.max_access)
        .bind(settings.expires_at)
        .bind(settings.password_hash.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_owned(&self, owner_id: Uuid, id: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM share_links WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
