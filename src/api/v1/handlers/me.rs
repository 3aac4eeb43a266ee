/*
 * Responsibility
 * - /me (自分のプロフィール) handler
 * - identity は middleware で解決済み (AuthCtx に載っている)
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::{
            Validate,
            me::{MeResponse, UpdateMeRequest},
        },
        extractors::{ApiJson, AuthCtxExtractor},
    },
    error::AppError,
    state::AppState,
};

pub async fn get_me(AuthCtxExtractor(auth): AuthCtxExtractor) -> Json<MeResponse> {
    Json(auth.identity.into())
}

pub async fn update_me(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    ApiJson(req): ApiJson<UpdateMeRequest>,
) -> Result<Json<MeResponse>, AppError> {
    req.validate()?;

    let name = req.name.as_deref().map(str::trim);
    let phone: Option<Option<&str>> = req.phone.as_ref().map(|inner| inner.as_deref());

    let row = state
        .repos
        .users
        .update_profile(&auth.identity.id, name, phone)
        .await?
        .ok_or(AppError::not_found("User"))?;

    Ok(Json(row.into()))
}
