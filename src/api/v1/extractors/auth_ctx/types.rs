/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が token 検証 + identity 解決をして request extensions に格納し、
 *   handler はこの型だけを受け取る
 */
use jsonwebtoken::Algorithm;

use crate::services::identity::Identity;
use crate::services::ownership::Owner;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `identity` は解決済みの shadow profile (リクエスト時点のスナップショット)
/// - `algorithm` は検証に使った strategy (ログ相関用)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub identity: Identity,
    pub algorithm: Algorithm,
}

impl AuthCtx {
    pub fn new(identity: Identity, algorithm: Algorithm) -> Self {
        Self {
            identity,
            algorithm,
        }
    }

    /// Owner reference for guarded reads and create stamping.
    pub fn owner(&self) -> Owner {
        Owner::of(&self.identity)
    }
}
