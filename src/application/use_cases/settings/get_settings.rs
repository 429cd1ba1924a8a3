use uuid::Uuid;

use crate::application::ports::user_repository::UserRepository;

pub struct GetSettings<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

/// Settings view; the hub token itself never leaves the repository layer.
#[derive(Debug, Clone)]
pub struct SettingsDto {
    pub email: String,
    pub name: String,
    pub has_hub_config: bool,
    pub hub_base_url: Option<String>,
}

impl<'a, R: UserRepository + ?Sized> GetSettings<'a, R> {
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<Option<SettingsDto>> {
        let row = match self.repo.find_by_id(user_id).await? {
            Some(r) => r,
            None => return Ok(None),
        };
        let hub = self.repo.hub_config(user_id).await?;
        Ok(Some(SettingsDto {
            email: row.email,
            name: row.name,
            has_hub_config: hub.is_some(),
            hub_base_url: hub.map(|h| h.base_url),
        }))
    }
}
