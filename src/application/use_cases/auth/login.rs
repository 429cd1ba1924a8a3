use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};

use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: the identity plus whether the account already has hub
/// credentials, so clients can route first-time users to settings.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserRow,
    pub has_hub_config: bool,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    pub async fn execute(&self, req: &LoginRequest) -> anyhow::Result<Option<LoginOutcome>> {
        let email = req.email.trim().to_ascii_lowercase();
        let row = match self.repo.find_by_email(&email).await? {
            Some(r) => r,
            None => return Ok(None),
        };
        let hash = row.password_hash.clone().unwrap_or_default();
        let parsed = PasswordHash::new(&hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed)
            .is_err()
        {
            return Ok(None);
        }
        let has_hub_config = self.repo.hub_config(row.id).await?.is_some();
        Ok(Some(LoginOutcome {
            user: UserRow {
                id: row.id,
                email: row.email,
                name: row.name,
                password_hash: None,
            },
            has_hub_config,
        }))
    }
}
