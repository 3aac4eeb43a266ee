//! Published key set (JWKS) fetching and caching.
//!
//! Refresh policy:
//! - keys are fresh for `ttl` after a successful fetch
//! - an unknown `kid` forces a refresh, at most once per `refresh_cooldown`
//! - a failed fetch keeps the previous keys (served stale); while the latest
//!   refresh has failed, any `kid` that is not cached is reported as
//!   `KeySetError`, both on that request and during the cooldown after it
//!
//! Concurrent refreshes are not coalesced; each replaces the key map with the
//! same document, so the last writer wins harmlessly.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, KeyAlgorithm, PublicKeyUse};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use url::Url;

#[derive(Debug, Clone, thiserror::Error)]
pub enum KeySetError {
    #[error("key set request failed: {0}")]
    Fetch(String),
    #[error("key set endpoint returned HTTP {0}")]
    Status(u16),
    #[error("key set document is invalid: {0}")]
    Parse(String),
    #[error("key set contains no usable RS256 signing keys")]
    NoUsableKeys,
}

/// Raw JWKS document. Keys stay untyped so one unsupported entry does not
/// invalidate the whole set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwksDocument {
    #[serde(default)]
    pub keys: Vec<serde_json::Value>,
}

/// Where the key set comes from.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    async fn fetch(&self) -> Result<JwksDocument, KeySetError>;
}

/// HTTPS GET against the provider's well-known JWKS URL.
pub struct HttpKeySetSource {
    url: Url,
    client: reqwest::Client,
}

impl HttpKeySetSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeySetError::Fetch(e.to_string()))?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn fetch(&self) -> Result<JwksDocument, KeySetError> {
        debug!(url = %self.url, "fetching key set");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| KeySetError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(KeySetError::Status(response.status().as_u16()));
        }

        response
            .json::<JwksDocument>()
            .await
            .map_err(|e| KeySetError::Parse(e.to_string()))
    }
}

#[derive(Default)]
struct CacheState {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
    last_attempt: Option<Instant>,
    last_error: Option<KeySetError>,
}

impl CacheState {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.fetched_at
            .is_some_and(|t| now.saturating_duration_since(t) < ttl)
    }

    fn may_refresh(&self, now: Instant, cooldown: Duration) -> bool {
        self.last_attempt
            .is_none_or(|t| now.saturating_duration_since(t) >= cooldown)
    }
}

pub struct KeySetCache {
    source: Arc<dyn KeySetSource>,
    ttl: Duration,
    refresh_cooldown: Duration,
    state: RwLock<CacheState>,
}

impl KeySetCache {
    pub fn new(source: Arc<dyn KeySetSource>, ttl: Duration, refresh_cooldown: Duration) -> Self {
        Self {
            source,
            ttl,
            refresh_cooldown,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Look up a decoding key by `kid`, refreshing according to the policy above.
    ///
    /// - `Ok(Some(_))`: key found (possibly stale after a failed refresh)
    /// - `Ok(None)`: the key set is available but has no such `kid`
    /// - `Err(_)`: the key set could not be fetched and nothing usable is cached
    pub async fn get(&self, kid: &str) -> Result<Option<DecodingKey>, KeySetError> {
        let now = Instant::now();
        {
            let state = self.state.read().await;
            let cached = state.keys.get(kid);
            if state.is_fresh(now, self.ttl) && cached.is_some() {
                return Ok(cached.cloned());
            }
            if !state.may_refresh(now, self.refresh_cooldown) {
                // Same answer as the request that hit the failed refresh.
                return match (cached, &state.last_error) {
                    (Some(key), _) => Ok(Some(key.clone())),
                    (None, Some(err)) => Err(err.clone()),
                    (None, None) => Ok(None),
                };
            }
        }

        let refreshed = self.refresh().await;

        let state = self.state.read().await;
        match (refreshed, state.keys.get(kid)) {
            (Ok(()), key) => Ok(key.cloned()),
            (Err(_), Some(key)) => {
                warn!(kid = %kid, "serving cached key after failed key set refresh");
                Ok(Some(key.clone()))
            }
            (Err(err), None) => Err(err),
        }
    }

    /// Fetch the key set and replace the cached keys on success.
    pub async fn refresh(&self) -> Result<(), KeySetError> {
        let result = self.source.fetch().await.and_then(usable_keys);

        let mut state = self.state.write().await;
        let now = Instant::now();
        state.last_attempt = Some(now);

        match result {
            Ok(keys) => {
                info!(keys = keys.len(), "key set refreshed");
                state.keys = keys;
                state.fetched_at = Some(now);
                state.last_error = None;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "key set refresh failed");
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub async fn key_count(&self) -> usize {
        self.state.read().await.keys.len()
    }
}

fn usable_keys(document: JwksDocument) -> Result<HashMap<String, DecodingKey>, KeySetError> {
    let mut keys = HashMap::new();

    for raw in document.keys {
        let jwk: Jwk = match serde_json::from_value(raw) {
            Ok(jwk) => jwk,
            Err(e) => {
                debug!(error = %e, "skipping unparseable jwk");
                continue;
            }
        };

        let Some(kid) = jwk.common.key_id.clone().filter(|k| !k.is_empty()) else {
            debug!("skipping jwk without kid");
            continue;
        };
        if !matches!(jwk.algorithm, AlgorithmParameters::RSA(_)) {
            debug!(kid = %kid, "skipping non-RSA jwk");
            continue;
        }
        if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
            debug!(kid = %kid, "skipping encryption jwk");
            continue;
        }
        if jwk
            .common
            .key_algorithm
            .as_ref()
            .is_some_and(|alg| *alg != KeyAlgorithm::RS256)
        {
            debug!(kid = %kid, "skipping jwk bound to another algorithm");
            continue;
        }

        match DecodingKey::from_jwk(&jwk) {
            Ok(key) => {
                keys.insert(kid, key);
            }
            Err(e) => warn!(kid = %kid, error = %e, "skipping invalid jwk"),
        }
    }

    if keys.is_empty() {
        return Err(KeySetError::NoUsableKeys);
    }
    Ok(keys)
}
