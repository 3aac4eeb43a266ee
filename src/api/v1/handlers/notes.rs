/*
 * Responsibility
 * - notes handler
 *   - 一覧/作成は親 pet 配下 (/me/pets/{pet_id}/notes): 先に pet を guard
 *   - 個別操作は /me/notes/{note_id}
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::{
            Validate,
            notes::{CreateNoteRequest, NoteResponse, UpdateNoteRequest},
        },
        extractors::{
            ApiJson, AuthCtxExtractor,
            public_id::{PublicNoteId, PublicPetId},
        },
        handlers::pets::owned_pet,
    },
    error::AppError,
    repos::note_repo::{NoteChanges, NoteDraft, NoteRow},
    services::ownership::{Owner, authorize},
    state::AppState,
};

const NOTE: &str = "Note";

async fn owned_note(state: &AppState, owner: &Owner, note_id: i64) -> Result<NoteRow, AppError> {
    let row = state.repos.notes.get(note_id).await?;
    Ok(authorize(owner, row, NOTE)?)
}

pub async fn list_notes(
    State(state): State<AppState>,
    pet_id: PublicPetId,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<Vec<NoteResponse>>, AppError> {
    let owner = auth.owner();
    let pet = owned_pet(&state, &owner, pet_id.id).await?;

    let rows = state.repos.notes.list_by_pet(&owner, pet.id).await?;
    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(NoteResponse::from_row(&state.id_codec, row)?);
    }

    Ok(Json(res))
}

pub async fn create_note(
    State(state): State<AppState>,
    pet_id: PublicPetId,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    ApiJson(req): ApiJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), AppError> {
    req.validate()?;

    let owner = auth.owner();
    let pet = owned_pet(&state, &owner, pet_id.id).await?;

    let row = state
        .repos
        .notes
        .create(&owner, pet.id, &NoteDraft::from(req))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(NoteResponse::from_row(&state.id_codec, row)?),
    ))
}

pub async fn get_note(
    State(state): State<AppState>,
    note_id: PublicNoteId,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<NoteResponse>, AppError> {
    let row = owned_note(&state, &auth.owner(), note_id.id).await?;
    Ok(Json(NoteResponse::from_row(&state.id_codec, row)?))
}

pub async fn update_note(
    State(state): State<AppState>,
    note_id: PublicNoteId,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    ApiJson(req): ApiJson<UpdateNoteRequest>,
) -> Result<Json<NoteResponse>, AppError> {
    req.validate()?;

    let owner = auth.owner();
    owned_note(&state, &owner, note_id.id).await?;

    let row = state
        .repos
        .notes
        .update(&owner, note_id.id, &NoteChanges::from(req))
        .await?
        .ok_or(AppError::not_found(NOTE))?;

    Ok(Json(NoteResponse::from_row(&state.id_codec, row)?))
}

pub async fn delete_note(
    State(state): State<AppState>,
    note_id: PublicNoteId,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<StatusCode, AppError> {
    let owner = auth.owner();
    owned_note(&state, &owner, note_id.id).await?;

    if state.repos.notes.delete(&owner, note_id.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(NOTE))
    }
}
