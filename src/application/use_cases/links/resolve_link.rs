use chrono::{DateTime, Utc};

use crate::application::ports::hub_port::{HubEntity, HubPort};
use crate::application::ports::link_repository::{AccessOutcome, LinkRepository};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::links::{AccessMode, LinkDenied};

/// The public read path: gate + increment through the repository's atomic
/// access step, then fan-out resolution of the linked entities through the
/// owner's hub credentials.
pub struct ResolveLink<'a> {
    pub links: &'a dyn LinkRepository,
    pub users: &'a dyn UserRepository,
    pub hub: &'a dyn HubPort,
}

#[derive(Debug)]
pub enum ResolveOutcome {
    Denied(LinkDenied),
    Granted {
        access_mode: AccessMode,
        entity_ids: Vec<String>,
        entities: Vec<HubEntity>,
    },
}

impl ResolveLink<'_> {
    pub async fn execute(
        &self,
        id: &str,
        password: Option<&str>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ResolveOutcome> {
        let link = match self.links.begin_access(id, password, now).await? {
            AccessOutcome::Denied(reason) => return Ok(ResolveOutcome::Denied(reason)),
            AccessOutcome::Granted(link) => link,
        };

        // The grant (and its counter increment) stands even if every entity
        // fails to resolve; per-entity failures are omitted, not escalated.
        let entities = match self.users.hub_config(link.owner_id).await? {
            Some(hub) => self.hub.fetch_states(&hub, &link.entity_ids).await,
            None => {
                tracing::warn!(link = %link.id, "share owner has no hub configured");
                Vec::new()
            }
        };

        Ok(ResolveOutcome::Granted {
            access_mode: link.access_mode,
            entity_ids: link.entity_ids,
            entities,
        })
    }
}
