use uuid::Uuid;

use crate::application::ports::entity_repository::{EntityRepository, EntityRow};

pub struct ListTracked<'a, R: EntityRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: EntityRepository + ?Sized> ListTracked<'a, R> {
    pub async fn execute(&self, owner_id: Uuid) -> anyhow::Result<Vec<EntityRow>> {
        self.repo.list_for_owner(owner_id).await
    }
}
