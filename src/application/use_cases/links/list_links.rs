use uuid::Uuid;

use crate::application::dto::links::LinkDto;
use crate::application::ports::link_repository::LinkRepository;

pub struct ListLinks<'a, R: LinkRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: LinkRepository + ?Sized> ListLinks<'a, R> {
    pub async fn execute(&self, owner_id: Uuid) -> anyhow::Result<Vec<LinkDto>> {
        let links = self.repo.list_for_owner(owner_id).await?;
        Ok(links.into_iter().map(LinkDto::from).collect())
    }
}
