//! Password hashing service

use anyhow::Result;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

/// One-way salted hashing of plaintext passwords. The stored form is an
/// argon2 PHC string, safe to persist; verification is constant-time.
pub struct PasswordService;

impl PasswordService {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with a fresh random salt. The same input
    /// produces a different stored form on every call.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        Ok(password_hash)
    }

    /// True iff `stored` was produced by `hash` from `plaintext`. A stored
    /// value that is not a valid PHC string never verifies.
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(stored) else {
            return false;
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new()
    }
}
