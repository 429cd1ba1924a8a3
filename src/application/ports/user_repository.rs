use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::hub_port::HubConfig;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<UserRow>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>>;

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool>;

    /// Hub credentials are sealed at rest; implementations return them
    /// ready to use.
    async fn hub_config(&self, id: Uuid) -> anyhow::Result<Option<HubConfig>>;

    async fn set_hub_config(&self, id: Uuid, hub: &HubConfig) -> anyhow::Result<bool>;

    /// All users that have hub credentials configured, for the refresh cycle.
    async fn list_hub_configured(&self) -> anyhow::Result<Vec<(Uuid, HubConfig)>>;
}
