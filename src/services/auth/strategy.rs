//! Verification strategies, one per accepted signing algorithm.
//!
//! A strategy only resolves the decoding key for a token; `TokenVerifier`
//! performs the signature and claim checks with the strategy's own algorithm.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey};

use crate::services::auth::access_jwt::{TokenError, TokenHeader};
use crate::services::auth::jwks::KeySetCache;

#[async_trait]
pub trait VerificationStrategy: Send + Sync {
    /// The single algorithm this strategy verifies.
    fn algorithm(&self) -> Algorithm;

    /// Resolve the key a token with this header must be verified against.
    async fn decoding_key(&self, header: &TokenHeader) -> Result<DecodingKey, TokenError>;
}

/// HS256 against the process-wide shared secret.
pub struct SharedSecretStrategy {
    key: Option<DecodingKey>,
}

impl SharedSecretStrategy {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            key: secret.map(|s| DecodingKey::from_secret(s.as_bytes())),
        }
    }
}

#[async_trait]
impl VerificationStrategy for SharedSecretStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::HS256
    }

    async fn decoding_key(&self, _header: &TokenHeader) -> Result<DecodingKey, TokenError> {
        self.key.clone().ok_or(TokenError::MissingServerSecret)
    }
}

/// RS256 against the identity provider's published key set.
pub struct PublicKeyStrategy {
    keys: Arc<KeySetCache>,
}

impl PublicKeyStrategy {
    pub fn new(keys: Arc<KeySetCache>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl VerificationStrategy for PublicKeyStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RS256
    }

    async fn decoding_key(&self, header: &TokenHeader) -> Result<DecodingKey, TokenError> {
        let kid = header
            .kid
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(TokenError::UnknownKeyId(None))?;

        self.keys
            .get(kid)
            .await
            .map_err(TokenError::KeySetUnavailable)?
            .ok_or_else(|| TokenError::UnknownKeyId(Some(kid.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::auth::jwks::KeySetError;
    use crate::services::auth::jwks::tests::{ScriptedSource, rsa_jwk};

    fn header(kid: Option<&str>) -> TokenHeader {
        TokenHeader {
            alg: "RS256".into(),
            kid: kid.map(str::to_owned),
        }
    }

    fn strategy(source: Arc<ScriptedSource>) -> PublicKeyStrategy {
        PublicKeyStrategy::new(Arc::new(KeySetCache::new(
            source,
            Duration::from_secs(3600),
            Duration::from_secs(3600),
        )))
    }

    #[tokio::test]
    async fn known_kid_resolves_to_a_key() {
        let strategy = strategy(ScriptedSource::new(vec![rsa_jwk("k1")]));

        assert!(strategy.decoding_key(&header(Some("k1"))).await.is_ok());
    }

    #[tokio::test]
    async fn kid_missing_from_the_key_set_is_unknown() {
        let strategy = strategy(ScriptedSource::new(vec![rsa_jwk("k1")]));

        let err = strategy
            .decoding_key(&header(Some("rotated")))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, TokenError::UnknownKeyId(Some(kid)) if kid == "rotated"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn header_without_kid_is_unknown_without_fetching() {
        let source = ScriptedSource::new(vec![rsa_jwk("k1")]);
        let strategy = strategy(source.clone());

        for kid in [None, Some("")] {
            let err = strategy.decoding_key(&header(kid)).await.unwrap_err();
            assert!(matches!(err, TokenError::UnknownKeyId(None)), "{err:?}");
        }
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn unreachable_key_set_is_unavailable() {
        let source = ScriptedSource::new(vec![]);
        source.set(Err(KeySetError::Fetch("connection refused".into())));
        let strategy = strategy(source);

        let err = strategy
            .decoding_key(&header(Some("k1")))
            .await
            .unwrap_err();
        assert!(
            matches!(err, TokenError::KeySetUnavailable(KeySetError::Fetch(_))),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn shared_secret_strategy_needs_a_secret() {
        let err = SharedSecretStrategy::new(None)
            .decoding_key(&header(None))
            .await
            .unwrap_err();
        assert!(matches!(err, TokenError::MissingServerSecret));
        assert!(
            SharedSecretStrategy::new(Some("s3cret"))
                .decoding_key(&header(None))
                .await
                .is_ok()
        );
    }
}
