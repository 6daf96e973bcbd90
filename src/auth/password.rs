use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid password hashing parameters: {0}")]
    InvalidParams(String),

    #[error("Stored password hash is not a PHC string: {0}")]
    InvalidHash(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Argon2id work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl PasswordPolicy {
    pub fn from_config(security: &SecurityConfig) -> Self {
        Self {
            memory_kib: security.password_memory_kib,
            iterations: security.password_iterations,
            parallelism: security.password_parallelism,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hash with a fresh random salt, producing a PHC string
pub fn hash_password(policy: &PasswordPolicy, password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = policy
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC string; its embedded parameters win
/// over the current policy.
pub fn verify_password(stored: &str, password: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: PasswordPolicy = PasswordPolicy {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn hash_and_verify() {
        let hash = hash_password(&FAST, "s3cret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "s3cret").unwrap());
        assert!(!verify_password(&hash, "S3cret").unwrap());
    }

    #[test]
    fn salts_differ_per_hash() {
        let a = hash_password(&FAST, "s3cret").unwrap();
        let b = hash_password(&FAST, "s3cret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn legacy_sha256_hash_does_not_verify() {
        let sha = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b";
        assert!(matches!(verify_password(sha, "secret"), Err(PasswordError::InvalidHash(_))));
    }

    #[test]
    fn rejects_bad_params() {
        let policy = PasswordPolicy { memory_kib: 1, iterations: 0, parallelism: 0 };
        assert!(matches!(hash_password(&policy, "x"), Err(PasswordError::InvalidParams(_))));
    }
}
