//! Ownership guard for owned resources.
//!
//! Reads pass fetched rows through [`authorize`]; creates stamp the owner from
//! the caller's [`Owner`], which can only be built from a resolved identity.

use thiserror::Error;

use crate::services::identity::Identity;

/// Owner reference derived from the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(String);

impl Owner {
    pub fn of(identity: &Identity) -> Self {
        Self(identity.id.clone())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub trait Owned {
    fn owner_id(&self) -> &str;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OwnershipError {
    // Absent and foreign resources are indistinguishable to the caller
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
}

pub fn authorize<T: Owned>(
    owner: &Owner,
    resource: Option<T>,
    kind: &'static str,
) -> Result<T, OwnershipError> {
    match resource {
        Some(r) if r.owner_id() == owner.as_str() => Ok(r),
        _ => Err(OwnershipError::NotFound { resource: kind }),
    }
}
