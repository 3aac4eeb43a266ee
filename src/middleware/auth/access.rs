//! access token 検証 → identity 解決 → AuthCtx を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` が無い/壊れている → 401 `No token`
//! - 検証失敗 (署名/alg/kid/claims/key set) → 401 `Invalid token` (詳細はログのみ)
//! - サーバ側の設定不備 (HS256 secret 未設定) → 500

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::TokenError;
use crate::services::auth::access_jwt::bearer_token;
use crate::state::AppState;

/// 保護ルートに認証を掛ける。
///
/// `route_layer` なので、存在しないパスは認証前に 404 になる。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // owned: the request body is not Sync, so no borrow of `req` may cross an await
    let token = match bearer_token(req.headers()) {
        Ok(token) => token.to_owned(),
        Err(err) => {
            tracing::debug!(error = ?err, "no bearer token");
            return Err(err.into());
        }
    };

    let claims = match state.auth.verify(&token).await {
        Ok(claims) => claims,
        Err(err) => {
            log_rejection(&err);
            return Err(err.into());
        }
    };

    let identity = state.identities.resolve(&claims).await?;
    tracing::debug!(
        subject = %identity.id,
        algorithm = ?claims.algorithm,
        "request authenticated"
    );

    // middleware → extractor への受け渡し
    req.extensions_mut()
        .insert(AuthCtx::new(identity, claims.algorithm));

    Ok(next.run(req).await)
}

fn log_rejection(err: &TokenError) {
    match err {
        TokenError::MissingServerSecret | TokenError::KeySetUnavailable(_) => {
            tracing::error!(error = ?err, "access token could not be verified");
        }
        _ => tracing::warn!(error = ?err, "access token verification failed"),
    }
}
