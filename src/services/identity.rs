/*
 * Responsibility
 * - 検証済み claim → アプリ内 Identity (shadow profile) の解決
 * - 初回アクセスで作成、以後は email のみ追従
 */
use std::sync::Arc;

use crate::repos::error::RepoResult;
use crate::repos::user_repo::UserRepo;
use crate::services::auth::VerifiedClaims;

pub use crate::repos::user_repo::UserRow as Identity;

#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserRepo>,
}

impl IdentityResolver {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self { users }
    }

    pub async fn resolve(&self, claims: &VerifiedClaims) -> RepoResult<Identity> {
        let email = claims.email.as_deref().unwrap_or("");
        self.users.upsert_shadow(&claims.subject, email).await
    }
}
