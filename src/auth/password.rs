// Password hashing utilities
// bcrypt, run on the blocking pool so request tasks never stall the runtime

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// bcrypt hasher with a fixed work factor
///
/// # Example
/// ```
/// use ipo_listings_api::auth::password::PasswordHasher;
///
/// let hasher = PasswordHasher::new(4);
/// let hash = hasher.hash("my_password").unwrap();
/// assert!(hasher.verify("my_password", &hash).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    // compared against when the user does not exist, so a miss costs as much as a hit
    dummy_hash: Arc<str>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    /// Creates a hasher; `cost` is clamped to bcrypt's supported range (4..=31)
    pub fn new(cost: u32) -> Self {
        let cost = cost.clamp(4, 31);
        // Only fails for an out-of-range cost, which the clamp rules out
        let dummy_hash = hash("unusable-dummy-password", cost).unwrap_or_default();
        Self {
            cost,
            dummy_hash: Arc::from(dummy_hash),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes a password on the current thread
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(hash(password, self.cost)?)
    }

    /// Verifies a password against a bcrypt hash on the current thread
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        Ok(verify(password, hash)?)
    }

    /// Hashes a password on tokio's blocking pool
    pub async fn hash_async(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    /// Verifies a password on tokio's blocking pool
    ///
    /// With `hash == None` (unknown user) a dummy hash is checked instead and
    /// `false` returned, so both paths take the same time.
    pub async fn verify_async(
        &self,
        password: String,
        hash: Option<String>,
    ) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify(&password, &hasher.dummy_hash).map(|_| false),
        })
        .await?
    }
}
