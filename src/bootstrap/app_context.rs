use std::sync::Arc;

use crate::application::ports::entity_repository::EntityRepository;
use crate::application::ports::hub_port::HubPort;
use crate::application::ports::link_repository::LinkRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    entity_repo: Arc<dyn EntityRepository>,
    link_repo: Arc<dyn LinkRepository>,
    hub_port: Arc<dyn HubPort>,
}

impl AppServices {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        entity_repo: Arc<dyn EntityRepository>,
        link_repo: Arc<dyn LinkRepository>,
        hub_port: Arc<dyn HubPort>,
    ) -> Self {
        Self {
            user_repo,
            entity_repo,
            link_repo,
            hub_port,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn entity_repo(&self) -> Arc<dyn EntityRepository> {
        self.services.entity_repo.clone()
    }

    pub fn link_repo(&self) -> Arc<dyn LinkRepository> {
        self.services.link_repo.clone()
    }

    pub fn hub_port(&self) -> Arc<dyn HubPort> {
        self.services.hub_port.clone()
    }
}
