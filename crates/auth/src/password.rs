//! Argon2id password hashing.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("invalid argon2 parameters: {0}")]
    Params(String),
}

/// Salted, deliberately slow one-way hashing of user secrets.
///
/// Digests are PHC strings (`$argon2id$v=19$...`) that carry their own salt
/// and parameters, so `verify` works across parameter changes.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl core::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash(&self, secret: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Always `false`, after spending about the cost of one [`Self::verify`].
    ///
    /// Used when there is no stored digest, so a missing account and a wrong
    /// secret take the same time.
    pub fn verify_absent(&self, secret: &str) -> bool {
        let _ = self.hash(secret);
        false
    }

    /// `false` for a wrong secret and for a digest that does not parse.
    pub fn verify(&self, secret: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            tracing::debug!("malformed password digest");
            return false;
        };
        self.argon2.verify_password(secret.as_bytes(), &parsed).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn fast() -> PasswordHasher {
        PasswordHasher::with_cost(Params::MIN_M_COST.max(64), 1, 1).unwrap()
    }

    #[test]
    fn round_trips_and_rejects_wrong_secret() {
        let hasher = fast();
        let digest = hasher.hash("correct horse").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &digest));
        assert!(!hasher.verify("correct horse ", &digest));
        assert!(!hasher.verify("", &digest));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let hasher = fast();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn malformed_digests_verify_false() {
        let hasher = fast();
        for digest in ["", "plaintext", "$argon2id$", "$2b$12$abcdefghijklmnopqrstuv"] {
            assert!(!hasher.verify("anything", digest));
        }
    }

    #[test]
    fn default_hasher_verifies_digests_from_cheaper_params() {
        let digest = fast().hash("pw").unwrap();
        assert!(PasswordHasher::new().verify("pw", &digest));
    }

    #[test]
    fn verify_absent_never_succeeds() {
        let hasher = fast();
        assert!(!hasher.verify_absent("correct horse"));
        assert!(!hasher.verify_absent(""));
    }

    #[test]
    fn rejects_invalid_params() {
        assert!(matches!(PasswordHasher::with_cost(1, 0, 1), Err(PasswordError::Params(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 8,
            ..ProptestConfig::default()
        })]

        #[test]
        fn hash_then_verify_round_trips(secret in ".{0,48}") {
            let hasher = fast();
            let digest = hasher.hash(&secret).unwrap();
            prop_assert!(hasher.verify(&secret, &digest));
            let wrong = format!("{secret}x");
            prop_assert!(!hasher.verify(&wrong, &digest));
        }
    }
}
