/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health 以外はすべて access middleware (Bearer 検証 + identity 解決) の内側
 */
use axum::{Router, routing::get};

use crate::middleware;
use crate::state::AppState;

use crate::api::v1::handlers::{
    events::{create_event, delete_event, get_event, list_events, update_event},
    health::health,
    me::{get_me, update_me},
    notes::{create_note, delete_note, get_note, list_notes, update_note},
    pets::{create_pet, delete_pet, get_pet, list_pets, update_pet},
};

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(get_me).put(update_me))
        .route("/me/pets", get(list_pets).post(create_pet))
        .route(
            "/me/pets/{pet_id}",
            get(get_pet).put(update_pet).delete(delete_pet),
        )
        .route(
            "/me/pets/{pet_id}/notes",
            get(list_notes).post(create_note),
        )
        .route(
            "/me/notes/{note_id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/me/events", get(list_events).post(create_event))
        .route(
            "/me/events/{event_id}",
            get(get_event).put(update_event).delete(delete_event),
        );

    Router::new()
        .route("/health", get(health))
        .merge(middleware::auth::access::apply(protected, state))
}
