use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::application::ports::entity_repository::{EntityRepository, EntitySnapshot};
use crate::application::ports::hub_port::HubPort;
use crate::application::ports::user_repository::UserRepository;

/// Periodic re-fetch of every user's tracked entities. Owned by the process
/// lifecycle: `run` loops until the shutdown channel flips, sharing the same
/// signal that stops the HTTP listener. Touches tracked entities only, never
/// link rows.
pub struct EntityRefresher {
    pub users: Arc<dyn UserRepository>,
    pub entities: Arc<dyn EntityRepository>,
    pub hub: Arc<dyn HubPort>,
}

impl EntityRefresher {
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        // the immediate first tick; start counting from now
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh_all().await {
                        // retried on the next tick only
                        tracing::error!(error = ?e, "entity refresh cycle failed");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("entity refresher stopping");
                        return;
                    }
                }
            }
        }
    }

    pub async fn refresh_all(&self) -> anyhow::Result<()> {
        let users = self.users.list_hub_configured().await?;
        let mut refreshed = 0usize;
        for (user_id, hub) in users {
            let tracked = match self.entities.list_for_owner(user_id).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(user = %user_id, error = ?e, "skipping user in refresh");
                    continue;
                }
            };
            if tracked.is_empty() {
                continue;
            }
            let ids: Vec<String> = tracked.iter().map(|t| t.entity_id.clone()).collect();
            let live = self.hub.fetch_states(&hub, &ids).await;
            for entity in live {
                let snapshot = EntitySnapshot {
                    state: entity.state,
                    attributes: entity.attributes,
                    last_changed: entity.last_changed,
                    last_updated: entity.last_updated,
                };
                match self
                    .entities
                    .update_snapshot(user_id, &entity.entity_id, &snapshot)
                    .await
                {
                    Ok(true) => refreshed += 1,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(user = %user_id, entity = %entity.entity_id, error = ?e,
                            "failed to store refreshed snapshot");
                    }
                }
            }
        }
        tracing::debug!(refreshed, "entity refresh cycle complete");
        Ok(())
    }
}
