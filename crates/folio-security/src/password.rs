//! Password hashing using Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use folio_core::{FolioError, FolioResult, Interface};
use shaku::Component;
use std::sync::Arc;
use tracing::debug;

/// Hashes and verifies account passwords.
pub trait PasswordHasherInterface: Interface + Send + Sync {
    /// Hashes a password with a fresh salt, returning the PHC string.
    fn hash(&self, password: &str) -> FolioResult<String>;

    /// Verifies a password against a stored PHC string.
    fn verify(&self, password: &str, hash: &str) -> FolioResult<bool>;
}

/// Argon2id password hasher.
#[derive(Component, Clone)]
#[shaku(interface = PasswordHasherInterface)]
pub struct PasswordHasher {
    argon2: Arc<Argon2<'static>>,
}

impl PasswordHasher {
    /// Iterations per hash.
    const TIME_COST: u32 = 3;

    /// Creates a hasher using `cost` MiB of memory per hash.
    #[must_use]
    pub fn with_cost(cost: u32) -> Self {
        let params = Params::new(cost.saturating_mul(1024), Self::TIME_COST, 1, None)
            .unwrap_or(Params::DEFAULT);

        Self {
            argon2: Arc::new(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)),
        }
    }

    /// The shared Argon2 context, for building the shaku component parameters.
    #[must_use]
    pub fn argon2_arc(&self) -> Arc<Argon2<'static>> {
        Arc::clone(&self.argon2)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Arc::new(Argon2::default()),
        }
    }
}

impl PasswordHasherInterface for PasswordHasher {
    fn hash(&self, password: &str) -> FolioResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| FolioError::Internal(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> FolioResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| FolioError::Internal(format!("Invalid password hash format: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => Err(FolioError::Internal(format!("Password verification error: {}", e))),
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}
