pub mod access_jwt;
pub mod factory;
pub mod jwks;
pub mod strategy;

pub use access_jwt::{TokenError, TokenVerifier, VerifiedClaims};
pub use factory::{build_token_verifier, build_token_verifier_with_source};
