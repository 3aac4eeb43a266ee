/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - 各層のエラー (token / repo / id codec / ownership) を統一的に変換
 * - 詳細はログにのみ出し、クライアントには汎用メッセージだけを返す
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::TokenError;
use crate::services::id_codec::IdCodecError;
use crate::services::ownership::OwnershipError;

pub const NO_TOKEN: &str = "No token";
pub const INVALID_TOKEN: &str = "Invalid token";
pub const BAD_INPUT: &str = "Bad input";
pub const INTERNAL: &str = "Internal Server Error";

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<Issue>>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad input ({} issues)", .issues.len())]
    BadInput { issues: Vec<Issue> },
    #[error("unauthorized: {message}")]
    Unauthorized { message: &'static str },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_input(issues: Vec<Issue>) -> Self {
        Self::BadInput { issues }
    }

    pub fn invalid_field(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadInput {
            issues: vec![Issue::new(path, message)],
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, issues) = match self {
            AppError::BadInput { issues } => {
                (StatusCode::BAD_REQUEST, BAD_INPUT.to_owned(), Some(issues))
            }
            AppError::Unauthorized { message } => {
                (StatusCode::UNAUTHORIZED, message.to_owned(), None)
            }
            AppError::NotFound { resource } => {
                (StatusCode::NOT_FOUND, format!("{resource} not found"), None)
            }
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Payload Too Large".to_owned(),
                None,
            ),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned(), None),
        };

        (status, Json(ErrorResponse { error, issues })).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::MissingToken => AppError::Unauthorized { message: NO_TOKEN },
            TokenError::MissingServerSecret => AppError::Internal,
            _ => AppError::Unauthorized {
                message: INVALID_TOKEN,
            },
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        tracing::error!(error = ?e, "repository failure");
        AppError::Internal
    }
}

impl From<IdCodecError> for AppError {
    fn from(e: IdCodecError) -> Self {
        if e.is_client_error() {
            // Client supplied a malformed public id (e.g. /me/pets/{pet_id})
            AppError::invalid_field("id", "invalid id")
        } else {
            // Server-side config / programming errors
            tracing::error!(error = ?e, "id codec failure");
            AppError::Internal
        }
    }
}

impl From<OwnershipError> for AppError {
    fn from(e: OwnershipError) -> Self {
        match e {
            OwnershipError::NotFound { resource } => AppError::NotFound { resource },
        }
    }
}
