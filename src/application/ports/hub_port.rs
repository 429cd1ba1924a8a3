use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::attributes::Attributes;

/// Per-user hub endpoint + bearer credential.
#[derive(Debug, Clone, PartialEq)]
pub struct HubConfig {
    pub base_url: String,
    pub token: String,
}

/// Live entity snapshot as served by the hub's states API.
#[derive(Debug, Clone)]
pub struct HubEntity {
    pub entity_id: String,
    pub state: String,
    pub attributes: Attributes,
    pub last_changed: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait HubPort: Send + Sync {
    async fn fetch_state(&self, hub: &HubConfig, entity_id: &str) -> anyhow::Result<HubEntity>;

    /// Fan-out fetch of several entities. Entities that fail to resolve are
    /// omitted from the result; partial success is not an error.
    async fn fetch_states(&self, hub: &HubConfig, entity_ids: &[String]) -> Vec<HubEntity>;

    async fn fetch_all_states(&self, hub: &HubConfig) -> anyhow::Result<Vec<HubEntity>>;

    async fn call_service(
        &self,
        hub: &HubConfig,
        domain: &str,
        action: &str,
        data: serde_json::Value,
    ) -> anyhow::Result<()>;
}
