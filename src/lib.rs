//! PetLife resource server.
//!
//! Bearer tokens from an external identity provider are verified (HS256 or
//! RS256 via JWKS), mapped to a shadow profile, and every pet, note and event
//! is scoped to that owner.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
