/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可, Auth 設定など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 * - 読み込み元は lookup 関数として受け取る (tests では HashMap を渡す)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Token verification settings.
///
/// `algorithms` is the operator's allowlist: a token whose header declares any
/// other algorithm is rejected before a strategy is even selected.
#[derive(Clone)]
pub struct AuthConfig {
    pub algorithms: Vec<Algorithm>,
    pub jwt_secret: Option<String>,
    pub jwks_url: Option<Url>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: u64,
    pub jwks_cache_ttl: Duration,
    pub jwks_refresh_cooldown: Duration,
    pub jwks_fetch_timeout: Duration,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the shared secret
        f.debug_struct("AuthConfig")
            .field("algorithms", &self.algorithms)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("jwks_url", &self.jwks_url.as_ref().map(Url::as_str))
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,

    pub auth: AuthConfig,
}

const DEFAULT_SQIDS_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = parse_or(&var, "PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let database_max_connections = parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10)?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let sqids_min_length = parse_or(&var, "SQIDS_MIN_LENGTH", 10)?;
        let sqids_alphabet =
            var("SQIDS_ALPHABET").unwrap_or_else(|| DEFAULT_SQIDS_ALPHABET.to_string());

        let request_timeout = Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECONDS", 30)?);
        let request_body_limit_bytes =
            parse_or(&var, "REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;

        let auth = auth_from_lookup(&var)?;

        Ok(Self {
            addr,
            database_url,
            database_max_connections,
            app_env,
            cors_allowed_origins,
            sqids_min_length,
            sqids_alphabet,
            request_timeout,
            request_body_limit_bytes,
            auth,
        })
    }
}

fn auth_from_lookup<F>(var: &F) -> Result<AuthConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let algorithms =
        parse_algorithms(&var("AUTH_ALGORITHMS").unwrap_or_else(|| "HS256,RS256".into()))?;

    // A missing secret is not a start-up failure: HS256 tokens are then rejected
    // per request as a server misconfiguration.
    let jwt_secret = var("AUTH_JWT_SECRET");

    let jwks_url = match var("AUTH_JWKS_URL") {
        Some(raw) => {
            Some(Url::parse(&raw).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?)
        }
        None => None,
    };
    if algorithms.contains(&Algorithm::RS256) && jwks_url.is_none() {
        return Err(ConfigError::Missing("AUTH_JWKS_URL"));
    }

    Ok(AuthConfig {
        algorithms,
        jwt_secret,
        jwks_url,
        issuer: var("AUTH_ISSUER"),
        audience: var("AUTH_AUDIENCE"),
        leeway_seconds: parse_or(var, "ACCESS_TOKEN_LEEWAY_SECONDS", 60)?,
        jwks_cache_ttl: Duration::from_secs(parse_or(var, "JWKS_CACHE_TTL_SECONDS", 3600)?),
        jwks_refresh_cooldown: Duration::from_secs(parse_or(
            var,
            "JWKS_REFRESH_COOLDOWN_SECONDS",
            30,
        )?),
        jwks_fetch_timeout: Duration::from_secs(parse_or(
            var,
            "JWKS_FETCH_TIMEOUT_SECONDS",
            10,
        )?),
    })
}

fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let alg =
            Algorithm::from_str(name).map_err(|_| ConfigError::Invalid("AUTH_ALGORITHMS"))?;
        // Only the two strategies this server implements can be enabled.
        if !matches!(alg, Algorithm::HS256 | Algorithm::RS256) {
            return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
        }
        if !algorithms.contains(&alg) {
            algorithms.push(alg);
        }
    }
    if algorithms.is_empty() {
        return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
    }
    Ok(algorithms)
}

fn parse_or<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
