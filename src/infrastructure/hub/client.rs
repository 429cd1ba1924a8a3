use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Deserialize;

use crate::application::ports::hub_port::{HubConfig, HubEntity, HubPort};
use crate::domain::attributes::Attributes;

const HUB_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client for the home-automation hub's states/services API. Stateless
/// per request: the credential comes in with every call because each user
/// brings their own.
pub struct ReqwestHubClient {
    http: reqwest::Client,
}

impl ReqwestHubClient {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(HUB_TIMEOUT).build()?;
        Ok(Self { http })
    }
}

#[derive(Debug, Deserialize)]
struct StatePayload {
    entity_id: String,
    state: String,
    #[serde(default)]
    attributes: serde_json::Value,
    last_changed: Option<DateTime<Utc>>,
    last_updated: Option<DateTime<Utc>>,
}

impl From<StatePayload> for HubEntity {
    fn from(p: StatePayload) -> Self {
        HubEntity {
            entity_id: p.entity_id,
            state: p.state,
            attributes: Attributes::new(p.attributes),
            last_changed: p.last_changed,
            last_updated: p.last_updated,
        }
    }
}

impl ReqwestHubClient {
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        hub: &HubConfig,
        path: &str,
    ) -> anyhow::Result<T> {
        let url = format!("{}/api/{}", hub.base_url.trim_end_matches('/'), path);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&hub.token)
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("hub returned {} for GET /api/{}", resp.status(), path);
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl HubPort for ReqwestHubClient {
    async fn fetch_state(&self, hub: &HubConfig, entity_id: &str) -> anyhow::Result<HubEntity> {
        let payload: StatePayload = self.get_json(hub, &format!("states/{entity_id}")).await?;
        Ok(payload.into())
    }

    async fn fetch_states(&self, hub: &HubConfig, entity_ids: &[String]) -> Vec<HubEntity> {
        let fetches = entity_ids.iter().map(|id| self.fetch_state(hub, id));
        join_all(fetches)
            .await
            .into_iter()
            .zip(entity_ids)
            .filter_map(|(res, id)| match res {
                Ok(entity) => Some(entity),
                Err(e) => {
                    tracing::debug!(entity = %id, error = ?e, "entity omitted from result");
                    None
                }
            })
            .collect()
    }

    async fn fetch_all_states(&self, hub: &HubConfig) -> anyhow::Result<Vec<HubEntity>> {
        let payload: Vec<StatePayload> = self.get_json(hub, "states").await?;
        Ok(payload.into_iter().map(HubEntity::from).collect())
    }

    async fn call_service(
        &self,
        hub: &HubConfig,
        domain: &str,
        action: &str,
        data: serde_json::Value,
    ) -> anyhow::Result<()> {
        let url = format!(
            "{}/api/services/{}/{}",
            hub.base_url.trim_end_matches('/'),
            domain,
            action
        );
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&hub.token)
            .json(&data)
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!(
                "hub returned {} for POST /api/services/{}/{}",
                resp.status(),
                domain,
                action
            );
        }
        Ok(())
    }
}
