/*
 * Responsibility
 * - /me/events 系 CRUD handler
 * - pet_id を指定された場合はその pet も guard を通す (他人の pet は 404)
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::{
            Validate,
            events::{CreateEventRequest, EventResponse, UpdateEventRequest},
        },
        extractors::{ApiJson, AuthCtxExtractor, public_id::PublicEventId},
        handlers::pets::owned_pet,
    },
    error::AppError,
    repos::event_repo::EventRow,
    services::ownership::{Owner, authorize},
    state::AppState,
};

const EVENT: &str = "Event";

async fn owned_event(
    state: &AppState,
    owner: &Owner,
    event_id: i64,
) -> Result<EventRow, AppError> {
    let row = state.repos.events.get(event_id).await?;
    Ok(authorize(owner, row, EVENT)?)
}

pub async fn list_events(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let rows = state.repos.events.list_by_owner(&auth.owner()).await?;

    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(EventResponse::from_row(&state.id_codec, row)?);
    }

    Ok(Json(res))
}

pub async fn create_event(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    req.validate()?;
    let draft = req.into_draft(&state.id_codec)?;

    let owner = auth.owner();
    if let Some(pet_id) = draft.pet_id {
        owned_pet(&state, &owner, pet_id).await?;
    }

    let row = state.repos.events.create(&owner, &draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse::from_row(&state.id_codec, row)?),
    ))
}

pub async fn get_event(
    State(state): State<AppState>,
    event_id: PublicEventId,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<EventResponse>, AppError> {
    let row = owned_event(&state, &auth.owner(), event_id.id).await?;
    Ok(Json(EventResponse::from_row(&state.id_codec, row)?))
}

pub async fn update_event(
    State(state): State<AppState>,
    event_id: PublicEventId,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    ApiJson(req): ApiJson<UpdateEventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    req.validate()?;
    let changes = req.into_changes(&state.id_codec)?;

    let owner = auth.owner();
    owned_event(&state, &owner, event_id.id).await?;
    if let Some(Some(pet_id)) = changes.pet_id {
        owned_pet(&state, &owner, pet_id).await?;
    }

    let row = state
        .repos
        .events
        .update(&owner, event_id.id, &changes)
        .await?
        .ok_or(AppError::not_found(EVENT))?;

    Ok(Json(EventResponse::from_row(&state.id_codec, row)?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    event_id: PublicEventId,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<StatusCode, AppError> {
    let owner = auth.owner();
    owned_event(&state, &owner, event_id.id).await?;

    if state.repos.events.delete(&owner, event_id.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(EVENT))
    }
}
