//! Password hashing.
//!
//! Credentials are stored as salted Argon2id hashes; the legacy plaintext
//! scheme is not reproduced.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::storage::StorageError;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, StorageError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StorageError::Corrupt(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored hash. Unparseable hashes
/// count as a mismatch rather than an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
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
    fn hash_and_verify_round_trip() {
        let hash = hash_password("manha123").unwrap();
        assert_ne!(hash, "manha123");
        assert!(verify_password("manha123", &hash));
        assert!(!verify_password("tarde123", &hash));
    }

    #[test]
    fn distinct_salts_produce_distinct_hashes() {
        let a = hash_password("admin123").unwrap();
        let b = hash_password("admin123").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("admin123", &a));
        assert!(verify_password("admin123", &b));
    }

    #[test]
    fn garbage_hash_is_a_mismatch() {
        assert!(!verify_password("admin123", "not-a-phc-string"));
    }
}
