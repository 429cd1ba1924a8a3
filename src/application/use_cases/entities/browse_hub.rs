use uuid::Uuid;

use crate::application::ports::hub_port::{HubEntity, HubPort};
use crate::application::ports::user_repository::UserRepository;

/// Lists everything the caller's hub credentials can see, live.
pub struct BrowseHub<'a> {
    pub users: &'a dyn UserRepository,
    pub hub: &'a dyn HubPort,
}

#[derive(Debug)]
pub enum BrowseOutcome {
    Entities(Vec<HubEntity>),
    HubNotConfigured,
    HubFailed(String),
}

impl BrowseHub<'_> {
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<BrowseOutcome> {
        let hub = match self.users.hub_config(user_id).await? {
            Some(h) => h,
            None => return Ok(BrowseOutcome::HubNotConfigured),
        };
        match self.hub.fetch_all_states(&hub).await {
            Ok(entities) => Ok(BrowseOutcome::Entities(entities)),
            Err(e) => Ok(BrowseOutcome::HubFailed(e.to_string())),
        }
    }
}
