//! In-process store implementing every repo trait.
//!
//! Mirrors the Postgres schema closely enough for handler tests: owner-scoped
//! writes, ordering, and the pet delete cascade (notes removed, events detached).

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::repos::error::RepoResult;
use crate::repos::event_repo::{EventChanges, EventDraft, EventRepo, EventRow};
use crate::repos::note_repo::{NoteChanges, NoteDraft, NoteRepo, NoteRow};
use crate::repos::pet_repo::{PetChanges, PetDraft, PetRepo, PetRow};
use crate::repos::user_repo::{UserRepo, UserRow};
use crate::services::ownership::Owner;

#[derive(Default)]
struct Tables {
    users: BTreeMap<String, UserRow>,
    pets: BTreeMap<i64, PetRow>,
    notes: BTreeMap<i64, NoteRow>,
    events: BTreeMap<i64, EventRow>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }
}

fn set_if<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

fn set_opt_if<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        *target = value.clone();
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn upsert_shadow(&self, id: &str, email: &str) -> RepoResult<UserRow> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let row = tables
            .users
            .entry(id.to_owned())
            .and_modify(|row| {
                if row.email != email {
                    row.email = email.to_owned();
                    row.updated_at = now;
                }
            })
            .or_insert_with(|| UserRow {
                id: id.to_owned(),
                email: email.to_owned(),
                name: None,
                phone: None,
                created_at: now,
                updated_at: now,
            });
        Ok(row.clone())
    }

    async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        phone: Option<Option<&str>>,
    ) -> RepoResult<Option<UserRow>> {
        let mut tables = self.tables.lock().await;
        let Some(row) = tables.users.get_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            row.name = Some(name.to_owned());
        }
        if let Some(phone) = phone {
            row.phone = phone.map(str::to_owned);
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

#[async_trait]
impl PetRepo for MemoryStore {
    async fn list_by_owner(&self, owner: &Owner) -> RepoResult<Vec<PetRow>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<PetRow> = tables
            .pets
            .values()
            .filter(|p| p.owner_id == owner.as_str())
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn create(&self, owner: &Owner, draft: &PetDraft) -> RepoResult<PetRow> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let now = Utc::now();
        let d = draft.details.clone();
        let row = PetRow {
            id,
            owner_id: owner.as_str().to_owned(),
            name: draft.name.clone(),
            sex: draft.sex.clone(),
            size: d.size,
            breed: d.breed,
            age_months: d.age_months,
            weight_kg: d.weight_kg,
            birthday_day: d.birthday_day,
            birthday_month: d.birthday_month,
            birth_date: d.birth_date,
            birth_year: d.birth_year,
            photo_bucket: d.photo.bucket,
            photo_path: d.photo.path,
            photo_url: d.photo.url,
            photo_size_bytes: d.photo.size_bytes,
            photo_width: d.photo.width,
            photo_height: d.photo.height,
            photo_format: d.photo.format,
            created_at: now,
            updated_at: now,
        };
        tables.pets.insert(id, row.clone());
        Ok(row)
    }

    async fn get(&self, pet_id: i64) -> RepoResult<Option<PetRow>> {
        Ok(self.tables.lock().await.pets.get(&pet_id).cloned())
    }

    async fn update(
        &self,
        owner: &Owner,
        pet_id: i64,
        changes: &PetChanges,
    ) -> RepoResult<Option<PetRow>> {
        let mut tables = self.tables.lock().await;
        let Some(row) = tables
            .pets
            .get_mut(&pet_id)
            .filter(|p| p.owner_id == owner.as_str())
        else {
            return Ok(None);
        };
        let d = &changes.details;
        set_if(&mut row.name, &changes.name);
        set_if(&mut row.sex, &changes.sex);
        set_opt_if(&mut row.size, &d.size);
        set_opt_if(&mut row.breed, &d.breed);
        set_opt_if(&mut row.age_months, &d.age_months);
        set_opt_if(&mut row.weight_kg, &d.weight_kg);
        set_opt_if(&mut row.birthday_day, &d.birthday_day);
        set_opt_if(&mut row.birthday_month, &d.birthday_month);
        set_opt_if(&mut row.birth_date, &d.birth_date);
        set_opt_if(&mut row.birth_year, &d.birth_year);
        set_opt_if(&mut row.photo_bucket, &d.photo.bucket);
        set_opt_if(&mut row.photo_path, &d.photo.path);
        set_opt_if(&mut row.photo_url, &d.photo.url);
        set_opt_if(&mut row.photo_size_bytes, &d.photo.size_bytes);
        set_opt_if(&mut row.photo_width, &d.photo.width);
        set_opt_if(&mut row.photo_height, &d.photo.height);
        set_opt_if(&mut row.photo_format, &d.photo.format);
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, owner: &Owner, pet_id: i64) -> RepoResult<bool> {
        let mut tables = self.tables.lock().await;
        let owned = tables
            .pets
            .get(&pet_id)
            .is_some_and(|p| p.owner_id == owner.as_str());
        if !owned {
            return Ok(false);
        }
        tables.pets.remove(&pet_id);
        tables.notes.retain(|_, n| n.pet_id != pet_id);
        for event in tables.events.values_mut() {
            if event.pet_id == Some(pet_id) {
                event.pet_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl NoteRepo for MemoryStore {
    async fn list_by_pet(&self, owner: &Owner, pet_id: i64) -> RepoResult<Vec<NoteRow>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<NoteRow> = tables
            .notes
            .values()
            .filter(|n| n.owner_id == owner.as_str() && n.pet_id == pet_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.noted_at, b.id).cmp(&(a.noted_at, a.id)));
        Ok(rows)
    }

    async fn create(&self, owner: &Owner, pet_id: i64, draft: &NoteDraft) -> RepoResult<NoteRow> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let now = Utc::now();
        let row = NoteRow {
            id,
            owner_id: owner.as_str().to_owned(),
            pet_id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            noted_at: draft.noted_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
        };
        tables.notes.insert(id, row.clone());
        Ok(row)
    }

    async fn get(&self, note_id: i64) -> RepoResult<Option<NoteRow>> {
        Ok(self.tables.lock().await.notes.get(&note_id).cloned())
    }

    async fn update(
        &self,
        owner: &Owner,
        note_id: i64,
        changes: &NoteChanges,
    ) -> RepoResult<Option<NoteRow>> {
        let mut tables = self.tables.lock().await;
        let Some(row) = tables
            .notes
            .get_mut(&note_id)
            .filter(|n| n.owner_id == owner.as_str())
        else {
            return Ok(None);
        };
        set_opt_if(&mut row.title, &changes.title);
        set_if(&mut row.content, &changes.content);
        set_if(&mut row.noted_at, &changes.noted_at);
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, owner: &Owner, note_id: i64) -> RepoResult<bool> {
        let mut tables = self.tables.lock().await;
        let owned = tables
            .notes
            .get(&note_id)
            .is_some_and(|n| n.owner_id == owner.as_str());
        if owned {
            tables.notes.remove(&note_id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl EventRepo for MemoryStore {
    async fn list_by_owner(&self, owner: &Owner) -> RepoResult<Vec<EventRow>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<EventRow> = tables
            .events
            .values()
            .filter(|e| e.owner_id == owner.as_str())
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.starts_at, a.id).cmp(&(b.starts_at, b.id)));
        Ok(rows)
    }

    async fn create(&self, owner: &Owner, draft: &EventDraft) -> RepoResult<EventRow> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let now = Utc::now();
        let row = EventRow {
            id,
            owner_id: owner.as_str().to_owned(),
            pet_id: draft.pet_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            starts_at: draft.starts_at,
            created_at: now,
            updated_at: now,
        };
        tables.events.insert(id, row.clone());
        Ok(row)
    }

    async fn get(&self, event_id: i64) -> RepoResult<Option<EventRow>> {
        Ok(self.tables.lock().await.events.get(&event_id).cloned())
    }

    async fn update(
        &self,
        owner: &Owner,
        event_id: i64,
        changes: &EventChanges,
    ) -> RepoResult<Option<EventRow>> {
        let mut tables = self.tables.lock().await;
        let Some(row) = tables
            .events
            .get_mut(&event_id)
            .filter(|e| e.owner_id == owner.as_str())
        else {
            return Ok(None);
        };
        set_if(&mut row.pet_id, &changes.pet_id);
        set_if(&mut row.title, &changes.title);
        set_if(&mut row.description, &changes.description);
        set_if(&mut row.starts_at, &changes.starts_at);
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, owner: &Owner, event_id: i64) -> RepoResult<bool> {
        let mut tables = self.tables.lock().await;
        let owned = tables
            .events
            .get(&event_id)
            .is_some_and(|e| e.owner_id == owner.as_str());
        if owned {
            tables.events.remove(&event_id);
        }
        Ok(owned)
    }
}
