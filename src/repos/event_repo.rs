/*
 * Responsibility
 * - events CRUD (予定・リマインダー)
 * - pet_id は任意。pet 削除時は SET NULL (FK 前提)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;
use crate::services::ownership::{Owned, Owner};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub owner_id: String,
    pub pet_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for EventRow {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub pet_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
}

// pet_id / description tri-state:
// - None: do not update
// - Some(None): set NULL
// - Some(Some(v)): set v
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub pet_id: Option<Option<i64>>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub starts_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait EventRepo: Send + Sync {
    /// Soonest `starts_at` first.
    async fn list_by_owner(&self, owner: &Owner) -> RepoResult<Vec<EventRow>>;

    async fn create(&self, owner: &Owner, draft: &EventDraft) -> RepoResult<EventRow>;

    async fn get(&self, event_id: i64) -> RepoResult<Option<EventRow>>;

    async fn update(
        &self,
        owner: &Owner,
        event_id: i64,
        changes: &EventChanges,
    ) -> RepoResult<Option<EventRow>>;

    async fn delete(&self, owner: &Owner, event_id: i64) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgEventRepo {
    pool: PgPool,
}

impl PgEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepo for PgEventRepo {
    async fn list_by_owner(&self, owner: &Owner) -> RepoResult<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, owner_id, pet_id, title, description, starts_at, created_at, updated_at
            FROM events
            WHERE owner_id = $1
            ORDER BY starts_at ASC, id ASC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn create(&self, owner: &Owner, draft: &EventDraft) -> RepoResult<EventRow> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (owner_id, pet_id, title, description, starts_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, pet_id, title, description, starts_at, created_at, updated_at
            "#,
        )
        .bind(owner.as_str())
        .bind(draft.pet_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.starts_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get(&self, event_id: i64) -> RepoResult<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, owner_id, pet_id, title, description, starts_at, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(
        &self,
        owner: &Owner,
        event_id: i64,
        changes: &EventChanges,
    ) -> RepoResult<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET
                pet_id = CASE
                    WHEN $3 = false THEN pet_id
                    ELSE $4
                END,
                title = COALESCE($5, title),
                description = CASE
                    WHEN $6 = false THEN description
                    ELSE $7
                END,
                starts_at = COALESCE($8, starts_at),
                updated_at = now()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, pet_id, title, description, starts_at, created_at, updated_at
            "#,
        )
        .bind(event_id)
        .bind(owner.as_str())
        .bind(changes.pet_id.is_some())
        .bind(changes.pet_id.flatten())
        .bind(&changes.title)
        .bind(changes.description.is_some())
        .bind(changes.description.clone().flatten())
        .bind(changes.starts_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, owner: &Owner, event_id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM events
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(event_id)
        .bind(owner.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
