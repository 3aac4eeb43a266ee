/*
 * Responsibility
 * - Events (予定・リマインダー) の request/response DTO
 * - pet_id は公開 ID で受け取り、codec で内部 ID へ復号する
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::{Validate, double_option, max_len, non_blank, require_text};
use crate::error::{AppError, Issue};
use crate::repos::event_repo::{EventChanges, EventDraft, EventRow};
use crate::services::id_codec::{self, IdCodec};

const MAX_TITLE: usize = 200;
const MAX_DESCRIPTION: usize = 2_000;

fn decode_pet_id(codec: &IdCodec, public_id: &str) -> Result<i64, AppError> {
    codec
        .decode(public_id)
        .map_err(|_| AppError::invalid_field("pet_id", "invalid id"))
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub pet_id: Option<String>,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
}

impl Validate for CreateEventRequest {
    fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        require_text(&mut issues, "title", &self.title);
        max_len(&mut issues, "title", Some(&self.title), MAX_TITLE);
        max_len(&mut issues, "description", self.description.as_deref(), MAX_DESCRIPTION);
        if self.starts_at.is_none() {
            issues.push(Issue::new("starts_at", "starts_at is required"));
        }
        issues
    }
}

impl CreateEventRequest {
    pub fn into_draft(self, codec: &IdCodec) -> Result<EventDraft, AppError> {
        let Some(starts_at) = self.starts_at else {
            return Err(AppError::invalid_field("starts_at", "starts_at is required"));
        };
        let pet_id = self
            .pet_id
            .as_deref()
            .map(|id| decode_pet_id(codec, id))
            .transpose()?;

        Ok(EventDraft {
            pet_id,
            title: self.title.trim().to_owned(),
            description: self.description,
            starts_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub pet_id: Option<Option<String>>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub starts_at: Option<DateTime<Utc>>,
}

impl Validate for UpdateEventRequest {
    fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        non_blank(&mut issues, "title", self.title.as_deref());
        max_len(&mut issues, "title", self.title.as_deref(), MAX_TITLE);
        max_len(
            &mut issues,
            "description",
            self.description.clone().flatten().as_deref(),
            MAX_DESCRIPTION,
        );
        issues
    }
}

impl UpdateEventRequest {
    pub fn into_changes(self, codec: &IdCodec) -> Result<EventChanges, AppError> {
        let pet_id = match self.pet_id {
            None => None,
            Some(None) => Some(None),
            Some(Some(id)) => Some(Some(decode_pet_id(codec, &id)?)),
        };

        Ok(EventChanges {
            pet_id,
            title: self.title.map(|t| t.trim().to_owned()),
            description: self.description,
            starts_at: self.starts_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: String,
    pub owner_id: String,
    pub pet_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventResponse {
    pub fn from_row(codec: &IdCodec, row: EventRow) -> id_codec::Result<Self> {
        Ok(Self {
            id: codec.encode(row.id)?,
            owner_id: row.owner_id,
            pet_id: row.pet_id.map(|id| codec.encode(id)).transpose()?,
            title: row.title,
            description: row.description,
            starts_at: row.starts_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
