use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use chrono::{DateTime, Utc};
use rand::RngCore;
use uuid::Uuid;

/// Expiration policy of a share link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Permanent,
    Counter,
    Time,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Permanent => "permanent",
            LinkKind::Counter => "counter",
            LinkKind::Time => "time",
        }
    }

    pub fn parse(s: &str) -> Option<LinkKind> {
        match s {
            "permanent" => Some(LinkKind::Permanent),
            "counter" => Some(LinkKind::Counter),
            "time" => Some(LinkKind::Time),
            _ => None,
        }
    }
}

/// Whether a link permits only reads or also action dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    Triggerable,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "readonly",
            AccessMode::Triggerable => "triggerable",
        }
    }

    pub fn parse(s: &str) -> Option<AccessMode> {
        match s {
            "readonly" => Some(AccessMode::ReadOnly),
            "triggerable" => Some(AccessMode::Triggerable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LinkDenied {
    #[error("share link not found")]
    NotFound,
    #[error("share link is no longer active")]
    Inactive,
    #[error("share link has reached its maximum access count")]
    Exhausted,
    #[error("share link has expired")]
    Expired,
    #[error("invalid share link password")]
    BadPassword,
    #[error("this share link is read-only")]
    ReadOnly,
    #[error("entity is not included in this share")]
    NotShared,
}

/// Outcome of the resolve-time gate. `deactivate` marks the one-way
/// active -> inactive flip that must be persisted alongside the denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveDecision {
    Grant,
    Deny { reason: LinkDenied, deactivate: bool },
}

#[derive(Debug, Clone)]
pub struct ShareLink {
    pub id: String,
    pub owner_id: Uuid,
    pub entity_ids: Vec<String>,
    pub kind: LinkKind,
    pub access_mode: AccessMode,
    pub access_count: i64,
    pub max_access: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ShareLink {
    pub fn permits_entity(&self, entity_id: &str) -> bool {
        self.entity_ids.iter().any(|e| e == entity_id)
    }

    fn exhausted(&self) -> bool {
        self.kind == LinkKind::Counter
            && self
                .max_access
                .is_some_and(|max| self.access_count >= max)
    }

    fn expired(&self, now: DateTime<Utc>) -> bool {
        self.kind == LinkKind::Time && self.expires_at.is_some_and(|exp| now > exp)
    }

    /// The read-access gate, evaluated in strict order: inactive, exhausted,
    /// expired, password. The caller persists the flip on a deactivating
    /// denial and increments `access_count` on a grant; no other transition
    /// exists. The increment must be the last mutation before the hub fetch.
    pub fn decide_resolve(&self, now: DateTime<Utc>, password: Option<&str>) -> ResolveDecision {
        if !self.active {
            return ResolveDecision::Deny {
                reason: LinkDenied::Inactive,
                deactivate: false,
            };
        }
        if self.exhausted() {
            return ResolveDecision::Deny {
                reason: LinkDenied::Exhausted,
                deactivate: true,
            };
        }
        if self.expired(now) {
            return ResolveDecision::Deny {
                reason: LinkDenied::Expired,
                deactivate: true,
            };
        }
        if !password_matches(self.password_hash.as_deref(), password) {
            return ResolveDecision::Deny {
                reason: LinkDenied::BadPassword,
                deactivate: false,
            };
        }
        ResolveDecision::Grant
    }

    /// The trigger gate. Triggers never mutate link state: an exhausted or
    /// expired link is denied here, but the active flip happens only on the
    /// resolve path, and triggers never count against `max_access`.
    pub fn decide_trigger(
        &self,
        now: DateTime<Utc>,
        entity_id: &str,
        password: Option<&str>,
    ) -> Result<(), LinkDenied> {
        if !self.active {
            return Err(LinkDenied::Inactive);
        }
        if self.exhausted() {
            return Err(LinkDenied::Exhausted);
        }
        if self.expired(now) {
            return Err(LinkDenied::Expired);
        }
        if !password_matches(self.password_hash.as_deref(), password) {
            return Err(LinkDenied::BadPassword);
        }
        if self.access_mode != AccessMode::Triggerable {
            return Err(LinkDenied::ReadOnly);
        }
        if !self.permits_entity(entity_id) {
            return Err(LinkDenied::NotShared);
        }
        Ok(())
    }
}

/// A missing stored hash means the link is open; a stored hash with no
/// supplied password never matches.
pub fn password_matches(stored: Option<&str>, supplied: Option<&str>) -> bool {
    match (stored, supplied) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(hash), Some(candidate)) => PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false),
    }
}

/// 128-bit random identifier, hex-encoded. The space is large enough that
/// collisions are negligible; no regeneration loop.
pub fn generate_link_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
