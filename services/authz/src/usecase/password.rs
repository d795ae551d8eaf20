use anyhow::anyhow;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::AuthzError;

/// Hash a plain-text password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthzError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?
        .to_string();
    Ok(hash)
}

/// Check a plain-text password against a stored PHC string.
///
/// A stored value that is not a PHC string is an internal error, not a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthzError> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("stored password hash unreadable: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
