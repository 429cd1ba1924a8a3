#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use hubshare::application::ports::entity_repository::{
    EntityRepository, EntityRow, EntitySnapshot,
};
use hubshare::application::ports::hub_port::{HubConfig, HubEntity, HubPort};
use hubshare::application::ports::link_repository::{AccessOutcome, LinkRepository, LinkSettings};
use hubshare::application::ports::user_repository::{UserRepository, UserRow};
use hubshare::domain::links::{LinkDenied, ResolveDecision, ShareLink};

// ---- links ----

#[derive(Default)]
pub struct FakeLinkRepo {
    pub links: Mutex<HashMap<String, ShareLink>>,
}

impl FakeLinkRepo {
    pub fn with(link: ShareLink) -> Self {
        let repo = FakeLinkRepo::default();
        repo.links.lock().unwrap().insert(link.id.clone(), link);
        repo
    }

    pub fn snapshot(&self, id: &str) -> Option<ShareLink> {
        self.links.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl LinkRepository for FakeLinkRepo {
    async fn create_link(&self, link: &ShareLink) -> anyhow::Result<()> {
        self.links
            .lock()
            .unwrap()
            .insert(link.id.clone(), link.clone());
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<ShareLink>> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find(&self, id: &str) -> anyhow::Result<Option<ShareLink>> {
        Ok(self.links.lock().unwrap().get(id).cloned())
    }

    async fn find_owned(&self, owner_id: Uuid, id: &str) -> anyhow::Result<Option<ShareLink>> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .get(id)
            .filter(|l| l.owner_id == owner_id)
            .cloned())
    }

    // Mirrors the production repository: the gate and the increment happen
    // under one lock, the same serialization the row lock provides.
    async fn begin_access(
        &self,
        id: &str,
        password: Option<&str>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<AccessOutcome> {
        let mut map = self.links.lock().unwrap();
        let Some(link) = map.get_mut(id) else {
            return Ok(AccessOutcome::Denied(LinkDenied::NotFound));
        };
        match link.decide_resolve(now, password) {
            ResolveDecision::Deny { reason, deactivate } => {
                if deactivate {
                    link.active = false;
                }
                Ok(AccessOutcome::Denied(reason))
            }
            ResolveDecision::Grant => {
                link.access_count += 1;
                Ok(AccessOutcome::Granted(link.clone()))
            }
        }
    }

    async fn save_settings(
        &self,
        owner_id: Uuid,
        id: &str,
        settings: &LinkSettings,
    ) -> anyhow::Result<bool> {
        let mut map = self.links.lock().unwrap();
        match map.get_mut(id) {
            Some(l) if l.owner_id == owner_id && l.active => {
                l.entity_ids = settings.entity_ids.clone();
                l.kind = settings.kind;
                l.access_mode = settings.access_mode;
                l.max_access = settings.max_access;
                l.expires_at = settings.expires_at;
                l.password_hash = settings.password_hash.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_owned(&self, owner_id: Uuid, id: &str) -> anyhow::Result<bool> {
        let mut map = self.links.lock().unwrap();
        match map.get(id) {
            Some(l) if l.owner_id == owner_id => {
                map.remove(id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ---- users ----

#[derive(Default)]
pub struct FakeUserRepo {
    pub users: Mutex<HashMap<Uuid, (UserRow, Option<HubConfig>)>>,
}

impl FakeUserRepo {
    pub fn with_hub_user(id: Uuid, hub: HubConfig) -> Self {
        let repo = FakeUserRepo::default();
        repo.users.lock().unwrap().insert(
            id,
            (
                UserRow {
                    id,
                    email: format!("{id}@example.test"),
                    name: "owner".into(),
                    password_hash: None,
                },
                Some(hub),
            ),
        );
        repo
    }
}

#[async_trait]
impl UserRepository for FakeUserRepo {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<UserRow> {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: Some(password_hash.to_string()),
        };
        self.users
            .lock()
            .unwrap()
            .insert(row.id, (row.clone(), None));
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|(u, _)| u.email == email)
            .map(|(u, _)| u.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        Ok(self.users.lock().unwrap().get(&id).map(|(u, _)| u.clone()))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get_mut(&id)
            .map(|(u, _)| u.password_hash = Some(password_hash.to_string()))
            .is_some())
    }

    async fn hub_config(&self, id: Uuid) -> anyhow::Result<Option<HubConfig>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&id)
            .and_then(|(_, hub)| hub.clone()))
    }

    async fn set_hub_config(&self, id: Uuid, hub: &HubConfig) -> anyhow::Result<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get_mut(&id)
            .map(|(_, h)| *h = Some(hub.clone()))
            .is_some())
    }

    async fn list_hub_configured(&self) -> anyhow::Result<Vec<(Uuid, HubConfig)>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(id, (_, hub))| hub.clone().map(|h| (*id, h)))
            .collect())
    }
}

// ---- tracked entities ----

#[derive(Default)]
pub struct FakeEntityRepo {
    pub rows: Mutex<Vec<EntityRow>>,
}

#[async_trait]
impl EntityRepository for FakeEntityRepo {
    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<EntityRow>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        owner_id: Uuid,
        entity_id: &str,
        snapshot: &EntitySnapshot,
    ) -> anyhow::Result<Option<EntityRow>> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|r| r.owner_id == owner_id && r.entity_id == entity_id)
        {
            return Ok(None);
        }
        let row = EntityRow {
            id: Uuid::new_v4(),
            owner_id,
            entity_id: entity_id.to_string(),
            state: snapshot.state.clone(),
            attributes: snapshot.attributes.clone(),
            last_changed: snapshot.last_changed,
            last_updated: snapshot.last_updated,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(Some(row))
    }

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.owner_id == owner_id && r.id == id));
        Ok(rows.len() < before)
    }

    async fn update_snapshot(
        &self,
        owner_id: Uuid,
        entity_id: &str,
        snapshot: &EntitySnapshot,
    ) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        for r in rows.iter_mut() {
            if r.owner_id == owner_id && r.entity_id == entity_id {
                r.state = snapshot.state.clone();
                r.attributes = snapshot.attributes.clone();
                r.last_changed = snapshot.last_changed;
                r.last_updated = snapshot.last_updated;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

// ---- hub ----

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub hub: HubConfig,
    pub domain: String,
    pub action: String,
    pub data: serde_json::Value,
}

#[derive(Default)]
pub struct FakeHub {
    pub states: Mutex<HashMap<String, HubEntity>>,
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl FakeHub {
    pub fn with_states(entities: Vec<HubEntity>) -> Self {
        let hub = FakeHub::default();
        {
            let mut states = hub.states.lock().unwrap();
            for e in entities {
                states.insert(e.entity_id.clone(), e);
            }
        }
        hub
    }
}

#[async_trait]
impl HubPort for FakeHub {
    async fn fetch_state(&self, _hub: &HubConfig, entity_id: &str) -> anyhow::Result<HubEntity> {
        self.states
            .lock()
            .unwrap()
            .get(entity_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown entity {entity_id}"))
    }

    async fn fetch_states(&self, hub: &HubConfig, entity_ids: &[String]) -> Vec<HubEntity> {
        let mut out = Vec::new();
        for id in entity_ids {
            if let Ok(e) = self.fetch_state(hub, id).await {
                out.push(e);
            }
        }
        out
    }

    async fn fetch_all_states(&self, _hub: &HubConfig) -> anyhow::Result<Vec<HubEntity>> {
        Ok(self.states.lock().unwrap().values().cloned().collect())
    }

    async fn call_service(
        &self,
        hub: &HubConfig,
        domain: &str,
        action: &str,
        data: serde_json::Value,
    ) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(RecordedCall {
            hub: hub.clone(),
            domain: domain.to_string(),
            action: action.to_string(),
            data,
        });
        Ok(())
    }
}

// ---- builders ----

pub fn hub_entity(entity_id: &str, state: &str) -> HubEntity {
    HubEntity {
        entity_id: entity_id.to_string(),
        state: state.to_string(),
        attributes: hubshare::domain::attributes::Attributes::new(
            serde_json::json!({ "friendly_name": entity_id }),
        ),
        last_changed: Some(Utc::now()),
        last_updated: Some(Utc::now()),
    }
}

pub fn owner_hub() -> HubConfig {
    HubConfig {
        base_url: "http://hub.local:8123".into(),
        token: "owner-bearer-token".into(),
    }
}
