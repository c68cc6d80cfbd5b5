//! One-way password hashing with Argon2id

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use tracing::error;

/// Hash a plaintext password with a fresh random salt
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// Check a plaintext password against a stored PHC hash
///
/// A stored hash that cannot be parsed never verifies.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(error = %e, "stored password hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("regularPassword").expect("hashing should succeed");
        assert!(verify_password("regularPassword", &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("regularPassword").expect("hashing should succeed");
        assert!(!verify_password("regularpassword", &hash));
    }

    #[test]
    fn hashing_twice_yields_different_outputs() {
        let first = hash_password("adminPassword").unwrap();
        let second = hash_password("adminPassword").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("adminPassword", &first));
        assert!(verify_password("adminPassword", &second));
    }

    #[test]
    fn hash_does_not_contain_the_plaintext() {
        let hash = hash_password("inactivePassword").unwrap();
        assert!(!hash.contains("inactivePassword"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn verify_is_false_for_malformed_hash() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
    }
}
