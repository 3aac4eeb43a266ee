/// Factory: build `TokenVerifier` from application `AuthConfig`.
use std::sync::Arc;

use anyhow::{Context, bail};
use jsonwebtoken::Algorithm;

use crate::config::AuthConfig;
use crate::services::auth::access_jwt::{ClaimRules, TokenVerifier};
use crate::services::auth::jwks::{HttpKeySetSource, KeySetCache, KeySetSource};
use crate::services::auth::strategy::{
    PublicKeyStrategy, SharedSecretStrategy, VerificationStrategy,
};

/// Build the verifier with the key set fetched over HTTPS from `AUTH_JWKS_URL`.
pub fn build_token_verifier(config: &AuthConfig) -> anyhow::Result<Arc<TokenVerifier>> {
    let key_source: Option<Arc<dyn KeySetSource>> = match &config.jwks_url {
        Some(url) => Some(Arc::new(
            HttpKeySetSource::new(url.clone(), config.jwks_fetch_timeout)
                .context("failed to build key set http client")?,
        )),
        None => None,
    };
    build_token_verifier_with_source(config, key_source)
}

/// Build the verifier with an explicit key set source (tests, alternative transports).
pub fn build_token_verifier_with_source(
    config: &AuthConfig,
    key_source: Option<Arc<dyn KeySetSource>>,
) -> anyhow::Result<Arc<TokenVerifier>> {
    let mut strategies: Vec<Arc<dyn VerificationStrategy>> = Vec::new();

    for alg in &config.algorithms {
        match alg {
            Algorithm::HS256 => {
                if config.jwt_secret.is_none() {
                    tracing::warn!(
                        "HS256 is enabled but AUTH_JWT_SECRET is not set; HS256 tokens will be rejected"
                    );
                }
                strategies.push(Arc::new(SharedSecretStrategy::new(
                    config.jwt_secret.as_deref(),
                )));
            }
            Algorithm::RS256 => {
                let Some(source) = key_source.clone() else {
                    bail!("RS256 is enabled but no key set source is configured");
                };
                let cache = KeySetCache::new(
                    source,
                    config.jwks_cache_ttl,
                    config.jwks_refresh_cooldown,
                );
                strategies.push(Arc::new(PublicKeyStrategy::new(Arc::new(cache))));
            }
            other => bail!("no verification strategy for {other:?}"),
        }
    }

    let rules = ClaimRules {
        issuer: config.issuer.clone(),
        audience: config.audience.clone(),
        leeway_seconds: config.leeway_seconds,
    };

    Ok(Arc::new(TokenVerifier::new(strategies, &rules)))
}
