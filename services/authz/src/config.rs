use crate::domain::types::ONE_MONTH_SECS;

/// Authorization service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthzConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL.
    pub redis_url: String,
    /// HMAC secret shared with the credential issuer.
    pub jwt_secret: String,
    /// Issuer of end-user credentials. Env var: `JWT_ISSUER`.
    pub jwt_issuer: String,
    /// Issuer of administrative credentials. Env var: `JWT_ISSUER_ADMIN`.
    pub jwt_issuer_admin: String,
    /// Namespace for every cache key (default `warden`). Env var: `CACHE_PREFIX`.
    pub cache_prefix: String,
    /// TTL of populated cache entries in seconds (default one month). Env var: `CACHE_TTL_SECS`.
    pub cache_ttl_secs: u64,
}

impl AuthzConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            jwt_issuer: std::env::var("JWT_ISSUER").expect("JWT_ISSUER"),
            jwt_issuer_admin: std::env::var("JWT_ISSUER_ADMIN").expect("JWT_ISSUER_ADMIN"),
            cache_prefix: std::env::var("CACHE_PREFIX").unwrap_or_else(|_| "warden".to_owned()),
            cache_ttl_secs: std::env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(ONE_MONTH_SECS),
        }
    }
}
