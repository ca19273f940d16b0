//! Credential hashing capability.
//!
//! Thin wrapper over Argon2: `hash(secret) -> digest`,
//! `verify(secret, digest) -> bool`. Never reimplemented in this crate.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::{QuillError, Result};

/// Hash a secret with a fresh random salt.
pub fn hash(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| QuillError::internal(format!("Password hashing failed: {}", e)))?;
    Ok(digest.to_string())
}

/// Verify a secret against a stored digest.
pub fn verify(secret: &str, digest: &str) -> Result<bool> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| QuillError::internal(format!("Stored digest is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let digest = hash("correct horse battery staple").unwrap();
        assert!(verify("correct horse battery staple", &digest).unwrap());
        assert!(!verify("wrong password", &digest).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash("same secret").unwrap();
        let b = hash("same secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_digest_is_an_error() {
        assert!(verify("anything", "not-a-phc-string").is_err());
    }
}
