use uuid::Uuid;

use crate::application::ports::entity_repository::EntityRepository;

pub struct UntrackEntity<'a, R: EntityRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: EntityRepository + ?Sized> UntrackEntity<'a, R> {
    pub async fn execute(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        self.repo.delete_owned(owner_id, id).await
    }
}
