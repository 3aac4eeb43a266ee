/*
 * Responsibility
 * - Pets の request/response DTO
 * - 公開 ID は encode 済みの値を返す (内部 ID を漏らさない)
 * - owner_id は body に来ても無視する (作成者から刻印)
 */
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::{Validate, in_range, max_len, non_blank, non_negative, require_text};
use crate::error::Issue;
use crate::repos::pet_repo::{PetChanges, PetDetails, PetDraft, PetRow, PhotoMeta};
use crate::services::id_codec::{self, IdCodec};

const MAX_TEXT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct CreatePetRequest {
    // defaulted so a missing field is reported as an issue, not a parse error
    #[serde(default)]
    pub name: String,
    #[serde(default)]
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
}

#[derive(Debug, Deserialize)]
pub struct UpdatePetRequest {
    pub name: Option<String>,
    pub sex: Option<String>,
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
}

fn detail_issues(issues: &mut Vec<Issue>, d: &PetDetails) {
    max_len(issues, "size", d.size.as_deref(), MAX_TEXT);
    max_len(issues, "breed", d.breed.as_deref(), MAX_TEXT);
    in_range(issues, "age_months", d.age_months, 0, 600);
    non_negative(issues, "weight_kg", d.weight_kg);
    in_range(issues, "birthday_day", d.birthday_day, 1, 31);
    in_range(issues, "birthday_month", d.birthday_month, 1, 12);
    in_range(issues, "birth_year", d.birth_year, 1900, 2100);
    max_len(issues, "photo_url", d.photo.url.as_deref(), 2048);
    non_negative(issues, "photo_size_bytes", d.photo.size_bytes);
    non_negative(issues, "photo_width", d.photo.width);
    non_negative(issues, "photo_height", d.photo.height);
}

impl CreatePetRequest {
    pub fn into_draft(self) -> PetDraft {
        PetDraft {
            name: self.name.trim().to_owned(),
            sex: self.sex.trim().to_owned(),
            details: PetDetails {
                size: self.size,
                breed: self.breed,
                age_months: self.age_months,
                weight_kg: self.weight_kg,
                birthday_day: self.birthday_day,
                birthday_month: self.birthday_month,
                birth_date: self.birth_date,
                birth_year: self.birth_year,
                photo: PhotoMeta {
                    bucket: self.photo_bucket,
                    path: self.photo_path,
                    url: self.photo_url,
                    size_bytes: self.photo_size_bytes,
                    width: self.photo_width,
                    height: self.photo_height,
                    format: self.photo_format,
                },
            },
        }
    }
}

impl Validate for PetDraft {
    fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        require_text(&mut issues, "name", &self.name);
        require_text(&mut issues, "sex", &self.sex);
        max_len(&mut issues, "name", Some(&self.name), MAX_TEXT);
        detail_issues(&mut issues, &self.details);
        issues
    }
}

impl UpdatePetRequest {
    pub fn into_changes(self) -> PetChanges {
        PetChanges {
            name: self.name.map(|n| n.trim().to_owned()),
            sex: self.sex.map(|s| s.trim().to_owned()),
            details: PetDetails {
                size: self.size,
                breed: self.breed,
                age_months: self.age_months,
                weight_kg: self.weight_kg,
                birthday_day: self.birthday_day,
                birthday_month: self.birthday_month,
                birth_date: self.birth_date,
                birth_year: self.birth_year,
                photo: PhotoMeta {
                    bucket: self.photo_bucket,
                    path: self.photo_path,
                    url: self.photo_url,
                    size_bytes: self.photo_size_bytes,
                    width: self.photo_width,
                    height: self.photo_height,
                    format: self.photo_format,
                },
            },
        }
    }
}

impl Validate for PetChanges {
    fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        non_blank(&mut issues, "name", self.name.as_deref());
        non_blank(&mut issues, "sex", self.sex.as_deref());
        max_len(&mut issues, "name", self.name.as_deref(), MAX_TEXT);
        detail_issues(&mut issues, &self.details);
        issues
    }
}

#[derive(Debug, Serialize)]
pub struct PetResponse {
    pub id: String, // encoded
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

impl PetResponse {
    pub fn from_row(codec: &IdCodec, row: PetRow) -> id_codec::Result<Self> {
        Ok(Self {
            id: codec.encode(row.id)?,
            owner_id: row.owner_id,
            name: row.name,
            sex: row.sex,
            size: row.size,
            breed: row.breed,
            age_months: row.age_months,
            weight_kg: row.weight_kg,
            birthday_day: row.birthday_day,
            birthday_month: row.birthday_month,
            birth_date: row.birth_date,
            birth_year: row.birth_year,
            photo_bucket: row.photo_bucket,
            photo_path: row.photo_path,
            photo_url: row.photo_url,
            photo_size_bytes: row.photo_size_bytes,
            photo_width: row.photo_width,
            photo_height: row.photo_height,
            photo_format: row.photo_format,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
