/*
 * Responsibility
 * - Notes (pet ごとの日誌) の request/response DTO
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::{Validate, max_len, non_blank, require_text};
use crate::error::Issue;
use crate::repos::note_repo::{NoteChanges, NoteDraft, NoteRow};
use crate::services::id_codec::{self, IdCodec};

const MAX_TITLE: usize = 200;
const MAX_CONTENT: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    pub noted_at: Option<DateTime<Utc>>,
}

impl Validate for CreateNoteRequest {
    fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        require_text(&mut issues, "content", &self.content);
        max_len(&mut issues, "content", Some(&self.content), MAX_CONTENT);
        max_len(&mut issues, "title", self.title.as_deref(), MAX_TITLE);
        issues
    }
}

impl From<CreateNoteRequest> for NoteDraft {
    fn from(req: CreateNoteRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            noted_at: req.noted_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub noted_at: Option<DateTime<Utc>>,
}

impl Validate for UpdateNoteRequest {
    fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        non_blank(&mut issues, "content", self.content.as_deref());
        max_len(&mut issues, "content", self.content.as_deref(), MAX_CONTENT);
        max_len(&mut issues, "title", self.title.as_deref(), MAX_TITLE);
        issues
    }
}

impl From<UpdateNoteRequest> for NoteChanges {
    fn from(req: UpdateNoteRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            noted_at: req.noted_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: String,
    pub owner_id: String,
    pub pet_id: String,
    pub title: Option<String>,
    pub content: String,
    pub noted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteResponse {
    pub fn from_row(codec: &IdCodec, row: NoteRow) -> id_codec::Result<Self> {
        Ok(Self {
            id: codec.encode(row.id)?,
            owner_id: row.owner_id,
            pet_id: codec.encode(row.pet_id)?,
            title: row.title,
            content: row.content,
            noted_at: row.noted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
