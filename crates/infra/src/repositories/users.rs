//! User account storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use devcamp_auth::{Role, User};
use devcamp_core::UserId;

use super::UserRepository;
use super::memory::InMemoryStore;
use crate::error::{StoreError, map_sqlx_error};

const EMAIL_KEY: &str = "users_email_key";

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    store: InMemoryStore<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        self.store.upsert_unique(
            user.clone(),
            |a, b| a.email.eq_ignore_ascii_case(&b.email),
            EMAIL_KEY,
        )
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.store.get(&id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.store.find(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn find_by_reset_token(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        Ok(self.store.find(|u| u.reset_token_matches(digest, now)))
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        self.store
            .replace_unique(
                user.clone(),
                |a, b| a.email.eq_ignore_ascii_case(&b.email),
                EMAIL_KEY,
            )
            .map(|_| ())
    }
}

const COLUMNS: &str =
    "id, name, email, role, password_hash, reset_password_token, reset_password_expire, created_at";

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, role, password_hash,
                reset_password_token, reset_password_expire, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.reset_password_token.as_deref())
        .bind(user.reset_password_expire)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        row.as_ref().map(decode_user).transpose()
    }

    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        row.as_ref().map(decode_user).transpose()
    }

    #[instrument(skip(self, digest), err)]
    async fn find_by_reset_token(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM users \
             WHERE reset_password_token = $1 AND reset_password_expire > $2"
        ))
        .bind(digest)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_reset_token", e))?;
        row.as_ref().map(decode_user).transpose()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn update(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users SET
                name = $2, email = $3, role = $4, password_hash = $5,
                reset_password_token = $6, reset_password_expire = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.reset_password_token.as_deref())
        .bind(user.reset_password_expire)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;
        Ok(())
    }
}

fn decode_user(row: &PgRow) -> Result<User, StoreError> {
    let decode = |e| map_sqlx_error("decode_user", e);
    let id: Uuid = row.try_get("id").map_err(decode)?;
    let role: String = row.try_get("role").map_err(decode)?;
    let role: Role = role
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("user {id}: {e}")))?;

    Ok(User {
        id: UserId::from_uuid(id),
        name: row.try_get("name").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        role,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        reset_password_token: row.try_get("reset_password_token").map_err(decode)?,
        reset_password_expire: row.try_get("reset_password_expire").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}
