use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use chrono::{DateTime, Utc};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::application::ports::link_repository::LinkRepository;
use crate::domain::links::{AccessMode, LinkKind, ShareLink, generate_link_id};

pub struct CreateLink<'a, R: LinkRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct CreateLinkInput {
    pub entity_ids: Vec<String>,
    pub kind: LinkKind,
    pub access_mode: AccessMode,
    pub max_access: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(ShareLink),
    Invalid(&'static str),
}

impl<'a, R: LinkRepository + ?Sized> CreateLink<'a, R> {
    pub async fn execute(
        &self,
        owner_id: Uuid,
        input: CreateLinkInput,
    ) -> anyhow::Result<CreateOutcome> {
        if input.entity_ids.is_empty() {
            return Ok(CreateOutcome::Invalid("entity_ids must not be empty"));
        }
        match input.kind {
            LinkKind::Counter if !input.max_access.is_some_and(|m| m >= 1) => {
                return Ok(CreateOutcome::Invalid(
                    "counter links require max_access >= 1",
                ));
            }
            LinkKind::Time if input.expires_at.is_none() => {
                return Ok(CreateOutcome::Invalid("time links require expires_at"));
            }
            _ => {}
        }

        let password_hash = match input.password.as_deref() {
            Some(p) if !p.is_empty() => {
                let salt = SaltString::generate(&mut OsRng);
                Some(
                    Argon2::default()
                        .hash_password(p.as_bytes(), &salt)
                        .map_err(|e| anyhow::anyhow!(e.to_string()))?
                        .to_string(),
                )
            }
            _ => None,
        };

        let link = ShareLink {
            id: generate_link_id(),
            owner_id,
            entity_ids: input.entity_ids,
            kind: input.kind,
            access_mode: input.access_mode,
            access_count: 0,
            max_access: if input.kind == LinkKind::Counter {
                input.max_access
            } else {
                None
            },
            expires_at: if input.kind == LinkKind::Time {
                input.expires_at
            } else {
                None
            },
            active: true,
            password_hash,
            created_at: Utc::now(),
        };
        self.repo.create_link(&link).await?;
        Ok(CreateOutcome::Created(link))
    }
}
