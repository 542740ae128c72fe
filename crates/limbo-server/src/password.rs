//! Password hashing.
//!
//! [`PasswordHasher`] is the seam between account handling and the hash
//! algorithm. [`Argon2Hasher`] stores the Argon2id PHC string as the opaque
//! hash bytes, so the salt and parameters travel with every hash and can be
//! tuned without invalidating existing accounts.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
};
use thiserror::Error;

/// Shortest password accepted for hashing.
pub const MIN_PASSWORD_LEN: usize = 3;

/// Salt size for Argon2 (128 bits)
const SALT_SIZE: usize = 16;

/// Errors from hashing a password.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Password below the minimum length
    #[error("password too short: minimum {min} characters")]
    TooShort {
        /// Minimum accepted length
        min: usize,
    },

    /// Hashing itself failed (RNG or parameter failure)
    #[error("hashing failed: {0}")]
    Failed(String),
}

/// Produces and checks opaque password hashes.
pub trait PasswordHasher: Send + Sync + 'static {
    /// Hash `plaintext` with a fresh salt.
    fn hash(&self, plaintext: &str) -> Result<Vec<u8>, HashError>;

    /// Whether `plaintext` matches `hash`. Malformed hashes never match.
    fn verify(&self, hash: &[u8], plaintext: &str) -> bool;
}

/// Argon2id password hasher.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Hasher with the recommended parameters (19 MiB, 2 passes, 1 lane).
    pub fn new() -> Self {
        Self { params: Params::default() }
    }

    /// Hasher with explicit parameters, e.g. cheap ones for tests.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<Vec<u8>, HashError> {
        if plaintext.chars().count() < MIN_PASSWORD_LEN {
            return Err(HashError::TooShort { min: MIN_PASSWORD_LEN });
        }

        let mut salt = [0u8; SALT_SIZE];
        getrandom::fill(&mut salt).map_err(|e| HashError::Failed(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt).map_err(|e| HashError::Failed(e.to_string()))?;

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashError::Failed(e.to_string()))?;

        Ok(hash.to_string().into_bytes())
    }

    fn verify(&self, hash: &[u8], plaintext: &str) -> bool {
        let Ok(text) = std::str::from_utf8(hash) else {
            return false;
        };
        let Ok(parsed) = PasswordHash::new(text) else {
            return false;
        };

        self.argon2().verify_password(plaintext.as_bytes(), &parsed).is_ok()
    }
}
