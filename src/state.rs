/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: TokenVerifier, identities: IdentityResolver, repos, id_codec
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use sqlx::PgPool;

use crate::repos::{
    event_repo::{EventRepo, PgEventRepo},
    memory::MemoryStore,
    note_repo::{NoteRepo, PgNoteRepo},
    pet_repo::{PetRepo, PgPetRepo},
    user_repo::{PgUserRepo, UserRepo},
};
use crate::services::{auth::TokenVerifier, id_codec::IdCodec, identity::IdentityResolver};

#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn UserRepo>,
    pub pets: Arc<dyn PetRepo>,
    pub notes: Arc<dyn NoteRepo>,
    pub events: Arc<dyn EventRepo>,
}

impl Repos {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepo::new(pool.clone())),
            pets: Arc::new(PgPetRepo::new(pool.clone())),
            notes: Arc::new(PgNoteRepo::new(pool.clone())),
            events: Arc::new(PgEventRepo::new(pool)),
        }
    }

    /// All four repos share one store so cascades behave like the database.
    pub fn memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            pets: Arc::new(store.clone()),
            notes: Arc::new(store.clone()),
            events: Arc::new(store),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<TokenVerifier>,
    pub identities: IdentityResolver,
    pub repos: Repos,
    pub id_codec: IdCodec,
}

impl AppState {
    pub fn new(auth: Arc<TokenVerifier>, repos: Repos, id_codec: IdCodec) -> Self {
        Self {
            auth,
            identities: IdentityResolver::new(repos.users.clone()),
            repos,
            id_codec,
        }
    }
}
