use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::links::ShareLink;

/// Owner-facing view of a share link. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct LinkDto {
    pub id: String,
    pub owner_id: Uuid,
    pub entity_ids: Vec<String>,
    pub kind: String,
    pub access_mode: String,
    pub access_count: i64,
    pub max_access: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub has_password: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ShareLink> for LinkDto {
    fn from(l: ShareLink) -> Self {
        LinkDto {
            id: l.id,
            owner_id: l.owner_id,
            entity_ids: l.entity_ids,
            kind: l.kind.as_str().to_string(),
            access_mode: l.access_mode.as_str().to_string(),
            access_count: l.access_count,
            max_access: l.max_access,
            expires_at: l.expires_at,
            active: l.active,
            has_password: l.password_hash.is_some(),
            created_at: l.created_at,
        }
    }
}
