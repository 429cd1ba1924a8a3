use chrono::{DateTime, Utc};

use crate::application::ports::hub_port::HubPort;
use crate::application::ports::link_repository::LinkRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::links::LinkDenied;

/// The public write path. Dispatches an action to the hub with the link
/// owner's credentials; the anonymous caller never supplies any. Never
/// mutates link state and never counts against `max_access`.
pub struct TriggerEntity<'a> {
    pub links: &'a dyn LinkRepository,
    pub users: &'a dyn UserRepository,
    pub hub: &'a dyn HubPort,
}

#[derive(Debug)]
pub enum TriggerOutcome {
    Denied(LinkDenied),
    BadEntityId,
    HubNotConfigured,
    UpstreamFailed(String),
    Dispatched,
}

impl TriggerEntity<'_> {
    pub async fn execute(
        &self,
        link_id: &str,
        entity_id: &str,
        action: &str,
        data: Option<serde_json::Value>,
        password: Option<&str>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<TriggerOutcome> {
        let link = match self.links.find(link_id).await? {
            Some(l) => l,
            None => return Ok(TriggerOutcome::Denied(LinkDenied::NotFound)),
        };
        if let Err(reason) = link.decide_trigger(now, entity_id, password) {
            return Ok(TriggerOutcome::Denied(reason));
        }

        // The action domain is the entity-id prefix: "light.kitchen" -> "light".
        let domain = match entity_id.split_once('.') {
            Some((domain, rest)) if !domain.is_empty() && !rest.is_empty() => domain,
            _ => return Ok(TriggerOutcome::BadEntityId),
        };

        let hub = match self.users.hub_config(link.owner_id).await? {
            Some(h) => h,
            None => return Ok(TriggerOutcome::HubNotConfigured),
        };

        let mut payload = match data {
            Some(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        payload.insert(
            "entity_id".to_string(),
            serde_json::Value::String(entity_id.to_string()),
        );

        match self
            .hub
            .call_service(&hub, domain, action, serde_json::Value::Object(payload))
            .await
        {
            Ok(()) => Ok(TriggerOutcome::Dispatched),
            // Dispatch failures surface upstream; they never feed back into
            // link state.
            Err(e) => Ok(TriggerOutcome::UpstreamFailed(e.to_string())),
        }
    }
}
