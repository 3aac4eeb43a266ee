/*
 * Responsibility
 * - /me (自分のプロフィール) の request/response DTO
 * - id は identity provider の subject をそのまま返す (sqids 対象外)
 */
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::{Validate, double_option, max_len, non_blank};
use crate::error::Issue;
use crate::services::identity::Identity;

#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    // Tri-state:
    // - None: field missing (do not update)
    // - Some(None): null (set NULL)
    // - Some(Some(v)): set value
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
}

impl Validate for UpdateMeRequest {
    fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        non_blank(&mut issues, "name", self.name.as_deref());
        max_len(&mut issues, "name", self.name.as_deref(), 100);
        max_len(&mut issues, "phone", self.phone.clone().flatten().as_deref(), 32);
        issues
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl From<Identity> for MeResponse {
    fn from(row: Identity) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            phone: row.phone,
        }
    }
}
