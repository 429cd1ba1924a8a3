use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use chrono::{DateTime, Utc};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::application::ports::link_repository::{LinkRepository, LinkSettings};
use crate::domain::links::{AccessMode, LinkKind, ShareLink};

pub struct UpdateLink<'a, R: LinkRepository + ?Sized> {
    pub repo: &'a R,
}

/// Partial update; absent fields keep their stored value. `password` is
/// Some("") to clear, Some(p) to replace, None to leave untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateLinkInput {
    pub entity_ids: Option<Vec<String>>,
    pub kind: Option<LinkKind>,
    pub access_mode: Option<AccessMode>,
    pub max_access: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(ShareLink),
    NotFound,
    /// Inactive is terminal; an exhausted or expired link cannot be revived
    /// through update. Recreate instead.
    Inactive,
    Invalid(&'static str),
}

impl<'a, R: LinkRepository + ?Sized> UpdateLink<'a, R> {
    pub async fn execute(
        &self,
        owner_id: Uuid,
        id: &str,
        input: UpdateLinkInput,
    ) -> anyhow::Result<UpdateOutcome> {
        let mut link = match self.repo.find_owned(owner_id, id).await? {
            Some(l) => l,
            None => return Ok(UpdateOutcome::NotFound),
        };
        if !link.active {
            return Ok(UpdateOutcome::Inactive);
        }

        if let Some(ids) = input.entity_ids {
            if ids.is_empty() {
                return Ok(UpdateOutcome::Invalid("entity_ids must not be empty"));
            }
            link.entity_ids = ids;
        }
        if let Some(kind) = input.kind {
            link.kind = kind;
        }
        if let Some(mode) = input.access_mode {
            link.access_mode = mode;
        }
        if let Some(max) = input.max_access {
            link.max_access = Some(max);
        }
        if let Some(exp) = input.expires_at {
            link.expires_at = Some(exp);
        }
        match link.kind {
            LinkKind::Counter if !link.max_access.is_some_and(|m| m >= 1) => {
                return Ok(UpdateOutcome::Invalid(
                    "counter links require max_access >= 1",
                ));
            }
            LinkKind::Time if link.expires_at.is_none() => {
                return Ok(UpdateOutcome::Invalid("time links require expires_at"));
            }
            _ => {}
        }
        match input.password.as_deref() {
            Some("") => link.password_hash = None,
            Some(p) => {
                let salt = SaltString::generate(&mut OsRng);
                link.password_hash = Some(
                    Argon2::default()
                        .hash_password(p.as_bytes(), &salt)
                        .map_err(|e| anyhow::anyhow!(e.to_string()))?
                        .to_string(),
                );
            }
            None => {}
        }

        let settings = LinkSettings {
            entity_ids: link.entity_ids.clone(),
            kind: link.kind,
            access_mode: link.access_mode,
            max_access: if link.kind == LinkKind::Counter {
                link.max_access
            } else {
                None
            },
            expires_at: if link.kind == LinkKind::Time {
                link.expires_at
            } else {
                None
            },
            password_hash: link.password_hash.clone(),
        };
        if !self.repo.save_settings(owner_id, id, &settings).await? {
            return Ok(UpdateOutcome::NotFound);
        }
        link.max_access = settings.max_access;
        link.expires_at = settings.expires_at;
        Ok(UpdateOutcome::Updated(link))
    }
}
