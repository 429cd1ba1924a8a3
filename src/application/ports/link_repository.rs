use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::links::{AccessMode, LinkDenied, LinkKind, ShareLink};

/// Result of the serialized check-then-increment at resolve time. On a grant
/// the returned link reflects the already-incremented counter.
#[derive(Debug, Clone)]
pub enum AccessOutcome {
    Granted(ShareLink),
    Denied(LinkDenied),
}

/// Owner-driven settings update. `access_count` and `active` are never
/// touched through this path.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    pub entity_ids: Vec<String>,
    pub kind: LinkKind,
    pub access_mode: AccessMode,
    pub max_access: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
}

#[async_trait]
pub trait LinkRepository: Send + Sync {
    async fn create_link(&self, link: &ShareLink) -> anyhow::Result<()>;

    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<ShareLink>>;

    async fn find(&self, id: &str) -> anyhow::Result<Option<ShareLink>>;

    async fn find_owned(&self, owner_id: Uuid, id: &str) -> anyhow::Result<Option<ShareLink>>;

    /// Runs the resolve-time gate and the counter increment as one atomic
    /// unit per link id: concurrent resolutions of the same id serialize
    /// here, so a counter link never grants more than `max_access` times.
    /// Exhaustion/expiry denials persist the one-way active flip.
    async fn begin_access(
        &self,
        id: &str,
        password: Option<&str>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<AccessOutcome>;

    async fn save_settings(
        &self,
        owner_id: Uuid,
        id: &str,
        settings: &LinkSettings,
    ) -> anyhow::Result<bool>;

    async fn delete_owned(&self, owner_id: Uuid, id: &str) -> anyhow::Result<bool>;
}
