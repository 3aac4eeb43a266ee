/*
 * Responsibility
 * - pets CRUD
 * - owner_id は作成時に Owner から刻印し、以後変更しない
 * - 更新/削除は owner_id でも絞り込む (guard と二重)
 * - 削除時: notes は CASCADE、events.pet_id は SET NULL (FK 前提)
 */
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;
use crate::services::ownership::{Owned, Owner};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PetRow {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub sex: String,
    pub size: Option<String>,
    pub breed: Option<String>,
    pub age_months: Option<i32>,
    pub weight_kg: Option<f64>,
    pub birthday_day: Option<i16>,
    pub birthday_month: Option<i16>,
    pub birth_date: Option<NaiveDate>,
    pub birth_year: Option<i32>,
    pub photo_bucket: Option<String>,
    pub photo_path: Option<String>,
    pub photo_url: Option<String>,
    pub photo_size_bytes: Option<i64>,
    pub photo_width: Option<i32>,
    pub photo_height: Option<i32>,
    pub photo_format: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for PetRow {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

/// Optional pet attributes. On create `None` stores NULL, on update `None` keeps the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PetDetails {
    pub size: Option<String>,
    pub breed: Option<String>,
    pub age_months: Option<i32>,
    pub weight_kg: Option<f64>,
    pub birthday_day: Option<i16>,
    pub birthday_month: Option<i16>,
    pub birth_date: Option<NaiveDate>,
    pub birth_year: Option<i32>,
    pub photo: PhotoMeta,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoMeta {
    pub bucket: Option<String>,
    pub path: Option<String>,
    pub url: Option<String>,
    pub size_bytes: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PetDraft {
    pub name: String,
    pub sex: String,
    pub details: PetDetails,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PetChanges {
    pub name: Option<String>,
    pub sex: Option<String>,
    pub details: PetDetails,
}

#[async_trait]
pub trait PetRepo: Send + Sync {
    /// Newest first.
    async fn list_by_owner(&self, owner: &Owner) -> RepoResult<Vec<PetRow>>;

    async fn create(&self, owner: &Owner, draft: &PetDraft) -> RepoResult<PetRow>;

    /// Unscoped lookup; callers pass the result through the ownership guard.
    async fn get(&self, pet_id: i64) -> RepoResult<Option<PetRow>>;

    async fn update(
        &self,
        owner: &Owner,
        pet_id: i64,
        changes: &PetChanges,
    ) -> RepoResult<Option<PetRow>>;

    async fn delete(&self, owner: &Owner, pet_id: i64) -> RepoResult<bool>;
}

const PET_COLUMNS: &str = r#"
    id, owner_id, name, sex, size, breed, age_months, weight_kg,
    birthday_day, birthday_month, birth_date, birth_year,
    photo_bucket, photo_path, photo_url, photo_size_bytes,
    photo_width, photo_height, photo_format,
    created_at, updated_at
"#;

#[derive(Clone, Debug)]
pub struct PgPetRepo {
    pool: PgPool,
}

impl PgPetRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PetRepo for PgPetRepo {
    async fn list_by_owner(&self, owner: &Owner) -> RepoResult<Vec<PetRow>> {
        let sql = format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, PetRow>(&sql)
            .bind(owner.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn create(&self, owner: &Owner, draft: &PetDraft) -> RepoResult<PetRow> {
        let sql = format!(
            r#"
            INSERT INTO pets (
                owner_id, name, sex, size, breed, age_months, weight_kg,
                birthday_day, birthday_month, birth_date, birth_year,
                photo_bucket, photo_path, photo_url, photo_size_bytes,
                photo_width, photo_height, photo_format
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {PET_COLUMNS}
            "#
        );
        let d = &draft.details;
        let row = sqlx::query_as::<_, PetRow>(&sql)
            .bind(owner.as_str())
            .bind(&draft.name)
            .bind(&draft.sex)
            .bind(&d.size)
            .bind(&d.breed)
            .bind(d.age_months)
            .bind(d.weight_kg)
            .bind(d.birthday_day)
            .bind(d.birthday_month)
            .bind(d.birth_date)
            .bind(d.birth_year)
            .bind(&d.photo.bucket)
            .bind(&d.photo.path)
            .bind(&d.photo.url)
            .bind(d.photo.size_bytes)
            .bind(d.photo.width)
            .bind(d.photo.height)
            .bind(&d.photo.format)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn get(&self, pet_id: i64) -> RepoResult<Option<PetRow>> {
        let sql = format!("SELECT {PET_COLUMNS} FROM pets WHERE id = $1");
        let row = sqlx::query_as::<_, PetRow>(&sql)
            .bind(pet_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn update(
        &self,
        owner: &Owner,
        pet_id: i64,
        changes: &PetChanges,
    ) -> RepoResult<Option<PetRow>> {
        let sql = format!(
            r#"
            UPDATE pets
            SET
                name = COALESCE($3, name),
                sex = COALESCE($4, sex),
                size = COALESCE($5, size),
                breed = COALESCE($6, breed),
                age_months = COALESCE($7, age_months),
                weight_kg = COALESCE($8, weight_kg),
                birthday_day = COALESCE($9, birthday_day),
                birthday_month = COALESCE($10, birthday_month),
                birth_date = COALESCE($11, birth_date),
                birth_year = COALESCE($12, birth_year),
                photo_bucket = COALESCE($13, photo_bucket),
                photo_path = COALESCE($14, photo_path),
                photo_url = COALESCE($15, photo_url),
                photo_size_bytes = COALESCE($16, photo_size_bytes),
                photo_width = COALESCE($17, photo_width),
                photo_height = COALESCE($18, photo_height),
                photo_format = COALESCE($19, photo_format),
                updated_at = now()
            WHERE id = $1 AND owner_id = $2
            RETURNING {PET_COLUMNS}
            "#
        );
        let d = &changes.details;
        let row = sqlx::query_as::<_, PetRow>(&sql)
            .bind(pet_id)
            .bind(owner.as_str())
            .bind(&changes.name)
            .bind(&changes.sex)
            .bind(&d.size)
            .bind(&d.breed)
            .bind(d.age_months)
            .bind(d.weight_kg)
            .bind(d.birthday_day)
            .bind(d.birthday_month)
            .bind(d.birth_date)
            .bind(d.birth_year)
            .bind(&d.photo.bucket)
            .bind(&d.photo.path)
            .bind(&d.photo.url)
            .bind(d.photo.size_bytes)
            .bind(d.photo.width)
            .bind(d.photo.height)
            .bind(&d.photo.format)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete(&self, owner: &Owner, pet_id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM pets
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(pet_id)
        .bind(owner.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
