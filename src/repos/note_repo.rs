/*
 * Responsibility
 * - notes CRUD (pet に紐づく日誌)
 * - pet_id の FK (CASCADE) 前提: pet 削除でまとめて消える
 * - 親 pet の所有確認は handler 側 (ownership guard) の責務
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;
use crate::services::ownership::{Owned, Owner};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct NoteRow {
    pub id: i64,
    pub owner_id: String,
    pub pet_id: i64,
    pub title: Option<String>,
    pub content: String,
    pub noted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for NoteRow {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDraft {
    pub title: Option<String>,
    pub content: String,
    /// Defaults to the insert time.
    pub noted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub noted_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait NoteRepo: Send + Sync {
    /// Most recent `noted_at` first.
    async fn list_by_pet(&self, owner: &Owner, pet_id: i64) -> RepoResult<Vec<NoteRow>>;

    async fn create(&self, owner: &Owner, pet_id: i64, draft: &NoteDraft) -> RepoResult<NoteRow>;

    async fn get(&self, note_id: i64) -> RepoResult<Option<NoteRow>>;

    async fn update(
        &self,
        owner: &Owner,
        note_id: i64,
        changes: &NoteChanges,
    ) -> RepoResult<Option<NoteRow>>;

    async fn delete(&self, owner: &Owner, note_id: i64) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgNoteRepo {
    pool: PgPool,
}

impl PgNoteRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepo for PgNoteRepo {
    async fn list_by_pet(&self, owner: &Owner, pet_id: i64) -> RepoResult<Vec<NoteRow>> {
        let rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, owner_id, pet_id, title, content, noted_at, created_at, updated_at
            FROM notes
            WHERE owner_id = $1 AND pet_id = $2
            ORDER BY noted_at DESC, id DESC
            "#,
        )
        .bind(owner.as_str())
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn create(&self, owner: &Owner, pet_id: i64, draft: &NoteDraft) -> RepoResult<NoteRow> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            INSERT INTO notes (owner_id, pet_id, title, content, noted_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, now()))
            RETURNING id, owner_id, pet_id, title, content, noted_at, created_at, updated_at
            "#,
        )
        .bind(owner.as_str())
        .bind(pet_id)
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(draft.noted_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get(&self, note_id: i64) -> RepoResult<Option<NoteRow>> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, owner_id, pet_id, title, content, noted_at, created_at, updated_at
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(note_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(
        &self,
        owner: &Owner,
        note_id: i64,
        changes: &NoteChanges,
    ) -> RepoResult<Option<NoteRow>> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            UPDATE notes
            SET
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                noted_at = COALESCE($5, noted_at),
                updated_at = now()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, pet_id, title, content, noted_at, created_at, updated_at
            "#,
        )
        .bind(note_id)
        .bind(owner.as_str())
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(changes.noted_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, owner: &Owner, note_id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM notes
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(note_id)
        .bind(owner.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
