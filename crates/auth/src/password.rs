//! Password hashing (Argon2id).
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=…,t=…,p=…$salt$hash`): they carry
//! the algorithm, its parameters and the salt, so a hash produced with one
//! work factor still verifies after the configured work factor changes.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("invalid hash parameters: {0}")]
    InvalidParams(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("stored hash is malformed: {0}")]
    MalformedHash(String),
}

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashParams {
    /// Check the parameters against Argon2's limits.
    pub fn validate(&self) -> Result<Params, HashError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| HashError::InvalidParams(e.to_string()))
    }
}

/// One-way transform from a plaintext password to a storable hash.
#[derive(Clone)]
pub struct CredentialHasher {
    params: HashParams,
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new(params: HashParams) -> Result<Self, HashError> {
        let validated = params.validate()?;
        Ok(Self {
            params,
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, validated),
        })
    }

    pub fn params(&self) -> HashParams {
        self.params
    }

    /// Hash `plaintext` with a fresh random salt.
    ///
    /// CPU- and memory-heavy; async callers should run it on a
    /// blocking thread.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            params: HashParams::default(),
            argon2: Argon2::default(),
        }
    }
}

impl core::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", &self.params)
            .finish()
    }
}

/// Check `plaintext` against a stored hash.
///
/// The parameters are read from the hash itself. Returns `Ok(false)` on a
/// mismatch and an error only when the stored value cannot be parsed.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> Result<bool, HashError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| HashError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(HashError::MalformedHash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest work factor Argon2 accepts; keeps the tests fast.
    fn cheap() -> CredentialHasher {
        CredentialHasher::new(HashParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn hash_is_not_the_plaintext() {
        let hash = cheap().hash("pw1").unwrap();
        assert_ne!(hash, "pw1");
    }

    #[test]
    fn hash_is_self_describing() {
        let hash = cheap().hash("pw1").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=8,t=1,p=1$"), "{hash}");
    }

    #[test]
    fn same_input_gets_a_different_salt_each_time() {
        let hasher = cheap();
        assert_ne!(hasher.hash("pw1").unwrap(), hasher.hash("pw1").unwrap());
    }

    #[test]
    fn verify_accepts_the_right_password_only() {
        let hash = cheap().hash("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn verify_uses_parameters_embedded_in_the_hash() {
        let strong = CredentialHasher::new(HashParams {
            memory_kib: 64,
            iterations: 2,
            parallelism: 2,
        })
        .unwrap();
        let hash = strong.hash("pw").unwrap();
        assert!(verify_password("pw", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let err = verify_password("pw", "plaintext-in-the-db").unwrap_err();
        assert!(matches!(err, HashError::MalformedHash(_)));
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let err = CredentialHasher::new(HashParams {
            memory_kib: 8,
            iterations: 0,
            parallelism: 1,
        })
        .unwrap_err();
        assert!(matches!(err, HashError::InvalidParams(_)));
    }

    #[test]
    fn default_params_validate() {
        assert!(HashParams::default().validate().is_ok());
    }
}
