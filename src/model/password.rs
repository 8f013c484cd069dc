//! Salted one-way password hashing (Argon2id, PHC string format).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tokio::sync::Semaphore;

/// OWASP Argon2id baseline: 19 MiB, two passes.
const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("password hash: {0}")]
    Hash(#[from] argon2::password_hash::Error),
    #[error("argon2 parameters: {0}")]
    Params(#[from] argon2::Error),
    #[error("hashing task: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("hashing permits closed")]
    Closed(#[from] tokio::sync::AcquireError),
}

/// Bounds concurrent hash and verify work, and with it the Argon2 memory in use.
fn hash_permits() -> Arc<Semaphore> {
    static PERMITS: OnceLock<Arc<Semaphore>> = OnceLock::new();
    PERMITS
        .get_or_init(|| {
            let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
            Arc::new(Semaphore::new(cpus))
        })
        .clone()
}

/// Run `work` on the blocking pool once one of `permits` is free. The permit
/// lives as long as the work, even if the caller stops waiting.
async fn run_limited<T, F>(permits: Arc<Semaphore>, work: F) -> Result<T, PasswordError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    let permit = permits.acquire_owned().await?;
    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    })
    .await?
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// A stored password hash. The plaintext is never kept.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl Password {
    /// Hash `plaintext` with a fresh random salt.
    pub fn hash(plaintext: &str) -> Result<Self, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = hasher()?
            .hash_password(plaintext.as_bytes(), &salt)?
            .to_string();
        Ok(Self { hash })
    }

    /// Same as [`Password::hash`], on the blocking thread pool.
    pub async fn hash_blocking(plaintext: String) -> Result<Self, PasswordError> {
        run_limited(hash_permits(), move || Self::hash(&plaintext)).await
    }

    /// Wrap a hash loaded from storage.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    pub fn as_hash(&self) -> &str {
        &self.hash
    }

    /// `Ok(false)` on mismatch; `Err` when the stored hash cannot be parsed or checked.
    pub fn matches(&self, plaintext: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(&self.hash)?;
        // Parameters are read back from the PHC string.
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Same as [`Password::matches`], on the blocking thread pool.
    pub async fn matches_blocking(&self, plaintext: String) -> Result<bool, PasswordError> {
        let password = self.clone();
        run_limited(hash_permits(), move || password.matches(&plaintext)).await
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}
