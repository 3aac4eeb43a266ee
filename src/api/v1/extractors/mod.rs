/*
 * Responsibility
 * - handler が受け取る extractor の集約
 * - AuthCtx / PublicId / Json の rejection をすべて AppError (JSON body) に揃える
 */
pub mod auth_ctx;
pub mod json;
pub mod public_id;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use json::ApiJson;
