//! Credential minting for gate tests.
//!
//! Warden only validates credentials. Tests need real signed tokens from both
//! issuers, so `TokenMinter` signs them with the shared test secret.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use jsonwebtoken::{EncodingKey, Header, encode};
use warden_auth_types::gate::{AccessGate, Issuers};
use warden_auth_types::token::{JwtClaims, JwtValidator};
use warden_domain::id::UserId;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";
pub const TEST_USER_ISSUER: &str = "warden-app";
pub const TEST_ADMIN_ISSUER: &str = "warden-cms";

pub struct TokenMinter {
    key: EncodingKey,
}

impl Default for TokenMinter {
    fn default() -> Self {
        Self::new(TEST_JWT_SECRET)
    }
}

impl TokenMinter {
    pub fn new(secret: &str) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn mint(&self, user_id: UserId, issuer: &str, exp: u64) -> String {
        let claims = JwtClaims {
            sub: user_id.to_string(),
            iss: issuer.to_owned(),
            exp,
        };
        encode(&Header::default(), &claims, &self.key).unwrap()
    }

    /// End-user credential valid for an hour.
    pub fn user_token(&self, user_id: UserId) -> String {
        self.mint(user_id, TEST_USER_ISSUER, in_one_hour())
    }

    /// Administrative credential valid for an hour.
    pub fn admin_token(&self, user_id: UserId) -> String {
        self.mint(user_id, TEST_ADMIN_ISSUER, in_one_hour())
    }

    /// Credential that expired long ago.
    pub fn expired_token(&self, user_id: UserId) -> String {
        self.mint(user_id, TEST_USER_ISSUER, 1_000_000)
    }
}

/// Gate wired to the test secret and issuers.
pub fn test_gate() -> AccessGate {
    AccessGate::new(
        Arc::new(JwtValidator::new(TEST_JWT_SECRET)),
        Issuers {
            user: TEST_USER_ISSUER.to_owned(),
            admin: TEST_ADMIN_ISSUER.to_owned(),
        },
    )
}

/// `Authorization: Bearer <token>` as a header map.
pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    map
}

fn in_one_hour() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600
}
