use uuid::Uuid;

use crate::application::ports::link_repository::LinkRepository;

pub struct DeleteLink<'a, R: LinkRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: LinkRepository + ?Sized> DeleteLink<'a, R> {
    /// Owner-only, unconditional: inactive links are deleted the same as
    /// active ones.
    pub async fn execute(&self, owner_id: Uuid, id: &str) -> anyhow::Result<bool> {
        self.repo.delete_owned(owner_id, id).await
    }
}
