//! Bearer credential validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "MINT_TOKENS", test))]
use serde::Serialize;

/// Errors returned by a [`CredentialValidator`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (UUID string) |
/// | `iss` | `iss` | issuer; end-user or administrative |
/// | `exp` | `exp` | expiry, seconds since epoch |
///
/// [`Serialize`] is only derived with the **`MINT_TOKENS`** feature. Warden never
/// issues credentials itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(any(feature = "MINT_TOKENS", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub iss: String,
    pub exp: u64,
}

/// Decodes a bearer credential and checks its signature and expiry.
///
/// Issuer policy is not the validator's concern; see [`crate::gate::AccessGate`].
pub trait CredentialValidator: Send + Sync {
    fn decode(&self, token: &str) -> Result<JwtClaims, AuthError>;
}

/// HS256 shared-secret validator.
#[derive(Clone)]
pub struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Validation: HS256, `exp` checked, required claims `exp`, `sub`, `iss`.
    /// Default leeway of 60s tolerates clock skew with the issuer.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl CredentialValidator for JwtValidator {
    fn decode(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            }
        })?;
        Ok(data.claims)
    }
}
