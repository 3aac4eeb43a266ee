/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: Bearer 検証 + identity 解決 (v1 の保護ルートのみ)
 * - cors / http / security_headers: Router 全体
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
