//! Password hashing.
//!
//! Passwords are stored only as Argon2id PHC strings with a random salt. The
//! store treats the digest as opaque text.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Hashing failed inside argon2.
#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(argon2::password_hash::Error);

/// Hash a password using Argon2id
///
/// # Errors
///
/// Returns [`HashError`] if argon2 rejects the input or parameters.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(HashError)
}

/// Verify a password against its digest
///
/// Returns `false` for a wrong password and for a digest that is not a valid
/// PHC string.
#[must_use]
pub fn verify_password(password: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        tracing::warn!("Stored credential is not a valid password hash");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let digest = hash_password("hunter2").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &digest));
        assert!(!verify_password("hunter3", &digest));
    }

    #[test]
    fn same_password_gets_different_salts() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn garbage_digest_never_verifies() {
        assert!(!verify_password("anything", "not a phc string"));
        assert!(!verify_password("", ""));
    }
}
