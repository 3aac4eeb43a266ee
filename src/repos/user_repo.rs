/*
 * Responsibility
 * - users テーブル (shadow profile) 向け SQLx 操作
 * - id は identity provider の subject (opaque string)
 * - 行は作成のみ・削除しない
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Create the profile if absent, otherwise refresh `email` only.
    async fn upsert_shadow(&self, id: &str, email: &str) -> RepoResult<UserRow>;

    // phone tri-state:
    // - None: do not update
    // - Some(None): set NULL
    // - Some(Some(v)): set v
    async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        phone: Option<Option<&str>>,
    ) -> RepoResult<Option<UserRow>>;
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn upsert_shadow(&self, id: &str, email: &str) -> RepoResult<UserRow> {
        // Single statement: concurrent first requests for one subject converge on one row.
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
            SET
                email = EXCLUDED.email,
                updated_at = CASE
                    WHEN users.email IS DISTINCT FROM EXCLUDED.email THEN now()
                    ELSE users.updated_at
                END
            RETURNING id, email, name, phone, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        phone: Option<Option<&str>>,
    ) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                phone = CASE
                    WHEN $3 = false THEN phone
                    ELSE $4
                END,
                updated_at = now()
            WHERE id = $1
            RETURNING id, email, name, phone, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(phone.is_some()) // $3: flag to set phone
        .bind(phone.flatten()) // $4: new phone value
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
