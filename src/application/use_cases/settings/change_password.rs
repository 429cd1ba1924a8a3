use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::application::ports::user_repository::UserRepository;

pub struct ChangePassword<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangePasswordOutcome {
    Changed,
    WrongCurrent,
    NotFound,
}

impl<'a, R: UserRepository + ?Sized> ChangePassword<'a, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        current: &str,
        new_password: &str,
    ) -> anyhow::Result<ChangePasswordOutcome> {
        let row = match self.repo.find_by_id(user_id).await? {
            Some(r) => r,
            None => return Ok(ChangePasswordOutcome::NotFound),
        };
        let stored = row.password_hash.unwrap_or_default();
        let parsed = PasswordHash::new(&stored).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        if Argon2::default()
            .verify_password(current.as_bytes(), &parsed)
            .is_err()
        {
            return Ok(ChangePasswordOutcome::WrongCurrent);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(new_password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        self.repo.set_password_hash(user_id, &hash).await?;
        Ok(ChangePasswordOutcome::Changed)
    }
}
