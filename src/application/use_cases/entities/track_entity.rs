use uuid::Uuid;

use crate::application::ports::entity_repository::{EntityRepository, EntityRow, EntitySnapshot};
use crate::application::ports::hub_port::HubPort;
use crate::application::ports::user_repository::UserRepository;

/// Starts tracking a hub entity: takes a live snapshot through the caller's
/// own credentials and stores it.
pub struct TrackEntity<'a> {
    pub users: &'a dyn UserRepository,
    pub entities: &'a dyn EntityRepository,
    pub hub: &'a dyn HubPort,
}

#[derive(Debug)]
pub enum TrackOutcome {
    Tracked(EntityRow),
    AlreadyTracked,
    HubNotConfigured,
    HubFailed(String),
}

impl TrackEntity<'_> {
    pub async fn execute(&self, owner_id: Uuid, entity_id: &str) -> anyhow::Result<TrackOutcome> {
        let hub = match self.users.hub_config(owner_id).await? {
            Some(h) => h,
            None => return Ok(TrackOutcome::HubNotConfigured),
        };
        let live = match self.hub.fetch_state(&hub, entity_id).await {
            Ok(e) => e,
            Err(e) => return Ok(TrackOutcome::HubFailed(e.to_string())),
        };
        let snapshot = EntitySnapshot {
            state: live.state,
            attributes: live.attributes,
            last_changed: live.last_changed,
            last_updated: live.last_updated,
        };
        match self.entities.insert(owner_id, entity_id, &snapshot).await? {
            Some(row) => Ok(TrackOutcome::Tracked(row)),
            None => Ok(TrackOutcome::AlreadyTracked),
        }
    }
}
