//! CORS policy for browser clients.
//!
//! Policy:
//! - Development: any origin, no credentials.
//! - Production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`, no credentials.
//!   An empty allowlist emits no CORS headers at all.
//!
//! Native apps and server-to-server callers are unaffected by CORS.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::middleware::http::REQUEST_ID_HEADER;

fn allowlist(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .map(|origin| origin.trim())
        // a wildcard inside an explicit list is rejected by tower-http
        .filter(|origin| *origin != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unusable CORS origin");
                None
            }
        })
        .collect()
}

/// Apply CORS policy to the given Router.
///
/// Never combine `Any` with `allow_credentials(true)`.
pub fn apply(router: Router, config: &Config) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let cors = if config.app_env.is_production() {
        let allowed = allowlist(&config.cors_allowed_origins);
        CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
    } else {
        CorsLayer::new().allow_origin(Any)
    }
    .allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        request_id.clone(),
    ])
    .expose_headers([request_id])
    .max_age(Duration::from_secs(10 * 60));

    router.layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist_trims_and_skips_unusable_values() {
        let origins = vec![
            " https://app.example.com ".to_owned(),
            "bad\norigin".to_owned(),
            "*".to_owned(),
        ];

        assert_eq!(
            allowlist(&origins),
            vec![HeaderValue::from_static("https://app.example.com")]
        );
    }
}
