/*
 * Responsibility
 * - /me/pets 系 CRUD handler
 * - Path の {pet_id} は公開 ID → extractor で復号化して内部 ID に変換して受け取る
 * - 取得系は ownership guard を通し、他人の pet は 404 に見せる
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::{
            Validate,
            pets::{CreatePetRequest, PetResponse, UpdatePetRequest},
        },
        extractors::{ApiJson, AuthCtxExtractor, public_id::PublicPetId},
    },
    error::AppError,
    repos::pet_repo::PetRow,
    services::ownership::{Owner, authorize},
    state::AppState,
};

pub(crate) const PET: &str = "Pet";

/// Fetch a pet and pass it through the ownership guard.
pub(crate) async fn owned_pet(
    state: &AppState,
    owner: &Owner,
    pet_id: i64,
) -> Result<PetRow, AppError> {
    let row = state.repos.pets.get(pet_id).await?;
    Ok(authorize(owner, row, PET)?)
}

pub async fn list_pets(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<Vec<PetResponse>>, AppError> {
    let rows = state.repos.pets.list_by_owner(&auth.owner()).await?;

    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(PetResponse::from_row(&state.id_codec, row)?);
    }

    Ok(Json(res))
}

pub async fn create_pet(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    ApiJson(req): ApiJson<CreatePetRequest>,
) -> Result<(StatusCode, Json<PetResponse>), AppError> {
    let draft = req.into_draft();
    draft.validate()?;

    let row = state.repos.pets.create(&auth.owner(), &draft).await?;
    tracing::info!(pet_id = row.id, owner = %row.owner_id, "pet created");

    Ok((
        StatusCode::CREATED,
        Json(PetResponse::from_row(&state.id_codec, row)?),
    ))
}

pub async fn get_pet(
    State(state): State<AppState>,
    pet_id: PublicPetId,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<PetResponse>, AppError> {
    let row = owned_pet(&state, &auth.owner(), pet_id.id).await?;
    Ok(Json(PetResponse::from_row(&state.id_codec, row)?))
}

pub async fn update_pet(
    State(state): State<AppState>,
    pet_id: PublicPetId,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    ApiJson(req): ApiJson<UpdatePetRequest>,
) -> Result<Json<PetResponse>, AppError> {
    let changes = req.into_changes();
    changes.validate()?;

    let owner = auth.owner();
    owned_pet(&state, &owner, pet_id.id).await?;

    let row = state
        .repos
        .pets
        .update(&owner, pet_id.id, &changes)
        .await?
        .ok_or(AppError::not_found(PET))?;

    Ok(Json(PetResponse::from_row(&state.id_codec, row)?))
}

pub async fn delete_pet(
    State(state): State<AppState>,
    pet_id: PublicPetId,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<StatusCode, AppError> {
    let owner = auth.owner();
    owned_pet(&state, &owner, pet_id.id).await?;

    if state.repos.pets.delete(&owner, pet_id.id).await? {
        tracing::info!(pet_id = pet_id.id, "pet deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(PET))
    }
}
