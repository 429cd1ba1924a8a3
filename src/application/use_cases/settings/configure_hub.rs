use uuid::Uuid;

use crate::application::ports::hub_port::{HubConfig, HubPort};
use crate::application::ports::user_repository::UserRepository;

/// Stores a user's hub endpoint + token after proving the pair works with a
/// live states call.
pub struct ConfigureHub<'a> {
    pub users: &'a dyn UserRepository,
    pub hub: &'a dyn HubPort,
}

#[derive(Debug)]
pub enum ConfigureHubOutcome {
    Saved,
    Rejected(String),
    NotFound,
}

impl ConfigureHub<'_> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        base_url: &str,
        token: &str,
    ) -> anyhow::Result<ConfigureHubOutcome> {
        let candidate = HubConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        };
        if let Err(e) = self.hub.fetch_all_states(&candidate).await {
            return Ok(ConfigureHubOutcome::Rejected(format!(
                "hub URL or token rejected: {e}"
            )));
        }
        if self.users.set_hub_config(user_id, &candidate).await? {
            Ok(ConfigureHubOutcome::Saved)
        } else {
            Ok(ConfigureHubOutcome::NotFound)
        }
    }
}
