use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::hub_port::HubConfig;
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::infrastructure::crypto;
use crate::infrastructure::db::PgPool;

pub struct SqlxUserRepository {
    pub pool: PgPool,
    encryption_key: String,
    /// Gateway-wide hub credential; users without their own fall back to it.
    default_hub: Option<HubConfig>,
}

impl SqlxUserRepository {
    pub fn new(
        pool: PgPool,
        encryption_key: impl Into<String>,
        default_hub: Option<HubConfig>,
    ) -> Self {
        Self {
            pool,
            encryption_key: encryption_key.into(),
            default_hub,
        }
    }

    fn unseal_hub(&self, base_url: Option<String>, token: Option<String>) -> Option<HubConfig> {
        let base_url = base_url?;
        let token = token?;
        match crypto::unseal_secret(&self.encryption_key, &token) {
            Ok(token) => Some(HubConfig { base_url, token }),
            Err(e) => {
                tracing::warn!(error = ?e, "stored hub token could not be unsealed");
                None
            }
        }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<UserRow> {
        let row = sqlx::query(
            r#"INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3)
               RETURNING id, email, name, password_hash"#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(UserRow {
            id: row.get("id"),
            email: row.get("email"),
            name: row.get("name"),
            password_hash: row.try_get("password_hash").ok(),
        })
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>> {
        let row =
            sqlx::query(r#"SELECT id, email, name, password_hash FROM users WHERE email = $1"#)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| UserRow {
            id: r.get("id"),
            email: r.get("email"),
            name: r.get("name"),
            password_hash: r.try_get("password_hash").ok(),
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(r#"SELECT id, email, name, password_hash FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| UserRow {
            id: r.get("id"),
            email: r.get("email"),
            name: r.get("name"),
            password_hash: r.try_get("password_hash").ok(),
        }))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn hub_config(&self, id: Uuid) -> anyhow::Result<Option<HubConfig>> {
        let row = sqlx::query("SELECT hub_base_url, hub_token FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let stored = row.and_then(|r| self.unseal_hub(r.get("hub_base_url"), r.get("hub_token")));
        Ok(stored.or_else(|| self.default_hub.clone()))
    }

    async fn set_hub_config(&self, id: Uuid, hub: &HubConfig) -> anyhow::Result<bool> {
        let sealed = crypto::seal_secret(&self.encryption_key, &hub.token)?;
        let res = sqlx::query("UPDATE users SET hub_base_url = $2, hub_token = $3 WHERE id = $1")
            .bind(id)
            .bind(&hub.base_url)
            .bind(sealed)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_hub_configured(&self) -> anyhow::Result<Vec<(Uuid, HubConfig)>> {
        let rows = sqlx::query(
            r#"SELECT id, hub_base_url, hub_token FROM users
               WHERE hub_base_url IS NOT NULL AND hub_token IS NOT NULL"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| {
                let id: Uuid = r.get("id");
                self.unseal_hub(r.get("hub_base_url"), r.get("hub_token"))
                    .map(|hub| (id, hub))
            })
            .collect())
    }
}
