//! Bearer token verification.
//!
//! The unverified header only *selects* a strategy; it never decides how a
//! strategy verifies. Each registered strategy owns exactly one algorithm and
//! the `Validation` built for it, so a token declaring `HS256` can only be
//! checked against the shared secret and a token declaring `RS256` only
//! against the published key set.

use std::str::FromStr;
use std::sync::Arc;

use axum::http::{HeaderMap, header};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;

use crate::services::auth::jwks::KeySetError;
use crate::services::auth::strategy::VerificationStrategy;

/// Why a token was rejected.
///
/// Only `MissingServerSecret` is a server fault; everything else is an
/// authentication failure. Detail is for logs, never for the client.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("shared secret is not configured")]
    MissingServerSecret,
    #[error("unknown key id: {0:?}")]
    UnknownKeyId(Option<String>),
    #[error("key set unavailable: {0}")]
    KeySetUnavailable(#[source] KeySetError),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid claims: {0}")]
    InvalidClaims(String),
}

/// The unverified JOSE header, read before any signature check.
///
/// `alg` stays a plain string so unknown values surface as
/// `UnsupportedAlgorithm` rather than as a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default)]
    pub kid: Option<String>,
}

/// Claims this server reads. `exp`, `nbf` when present, and `iss`/`aud` when configured are
/// checked by `jsonwebtoken::Validation`.
#[derive(Debug, Deserialize)]
struct AccessTokenClaims {
    #[serde(default)]
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// Verified claim set handed to the identity resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub subject: String,
    pub email: Option<String>,
    pub algorithm: Algorithm,
}

/// Claim checks shared by every strategy.
#[derive(Debug, Clone, Default)]
pub struct ClaimRules {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: u64,
}

impl ClaimRules {
    fn validation_for(&self, alg: Algorithm) -> Validation {
        let mut validation = Validation::new(alg);
        validation.leeway = self.leeway_seconds;
        validation.validate_nbf = true;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            // Provider tokens carry an `aud`; without a configured audience we do not check it.
            None => validation.validate_aud = false,
        }
        validation
    }
}

struct Registered {
    strategy: Arc<dyn VerificationStrategy>,
    validation: Validation,
}

pub struct TokenVerifier {
    strategies: Vec<Registered>,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.algorithms())
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(strategies: Vec<Arc<dyn VerificationStrategy>>, rules: &ClaimRules) -> Self {
        let strategies = strategies
            .into_iter()
            .map(|strategy| Registered {
                validation: rules.validation_for(strategy.algorithm()),
                strategy,
            })
            .collect();
        Self { strategies }
    }

    pub fn algorithms(&self) -> Vec<Algorithm> {
        self.strategies
            .iter()
            .map(|r| r.strategy.algorithm())
            .collect()
    }

    /// Verify signature and claims, then convert into the application claim set.
    pub async fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        let header = decode_header(token)?;

        let alg = Algorithm::from_str(&header.alg)
            .map_err(|_| TokenError::UnsupportedAlgorithm(header.alg.clone()))?;
        let registered = self
            .strategies
            .iter()
            .find(|r| r.strategy.algorithm() == alg)
            .ok_or_else(|| TokenError::UnsupportedAlgorithm(header.alg.clone()))?;

        let key = registered.strategy.decoding_key(&header).await?;

        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &registered.validation)
                .map_err(classify)?;

        let subject = data.claims.sub.trim();
        if subject.is_empty() {
            return Err(TokenError::InvalidClaims("empty 'sub' claim".into()));
        }

        Ok(VerifiedClaims {
            subject: subject.to_string(),
            email: data.claims.email.filter(|e| !e.trim().is_empty()),
            algorithm: alg,
        })
    }
}

/// Read `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(TokenError::MissingToken)?;

    if token.is_empty() {
        return Err(TokenError::MissingToken);
    }
    Ok(token)
}

/// Check the compact serialization and decode the header segment without verifying anything.
pub fn decode_header(token: &str) -> Result<TokenHeader, TokenError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::MalformedToken("expected three segments"));
    };

    if header.is_empty() || payload.is_empty() {
        return Err(TokenError::MalformedToken("empty segment"));
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::MalformedToken("header is not base64url"))?;
    if URL_SAFE_NO_PAD.decode(payload).is_err() || URL_SAFE_NO_PAD.decode(signature).is_err() {
        return Err(TokenError::MalformedToken("segment is not base64url"));
    }

    serde_json::from_slice::<TokenHeader>(&header_bytes)
        .map_err(|_| TokenError::MalformedToken("header is not a JOSE object"))
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::InvalidClaims("token expired".into()),
        ErrorKind::ImmatureSignature => TokenError::InvalidClaims("token not yet valid".into()),
        ErrorKind::InvalidIssuer => TokenError::InvalidClaims("issuer mismatch".into()),
        ErrorKind::InvalidAudience => TokenError::InvalidClaims("audience mismatch".into()),
        ErrorKind::MissingRequiredClaim(name) => {
            TokenError::InvalidClaims(format!("missing '{name}' claim"))
        }
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => TokenError::MalformedToken("undecodable token"),
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::UnsupportedAlgorithm(format!("{:?}", err.kind()))
        }
        _ => TokenError::InvalidSignature,
    }
}
