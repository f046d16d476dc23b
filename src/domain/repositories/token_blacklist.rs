use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::RepositoryResult;

/// A refresh token that may no longer be exchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistedToken {
    /// The token's `jti` claim
    pub jti: Uuid,
    pub user_id: i64,
    /// The token's own expiry; after it the entry can be pruned
    pub expires_at: DateTime<Utc>,
}

/// Persisted set of revoked refresh tokens, keyed by `jti`
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Add a token to the blacklist
    ///
    /// Returns `false` if it was already blacklisted. The check and insert are
    /// atomic, so of two concurrent calls for one `jti` exactly one gets `true`.
    async fn blacklist(&self, token: BlacklistedToken) -> RepositoryResult<bool>;

    /// Whether the token has been blacklisted
    async fn is_blacklisted(&self, jti: Uuid) -> RepositoryResult<bool>;

    /// Drop entries expiring strictly before `cutoff`; returns how many
    async fn prune_expired(&self, cutoff: DateTime<Utc>) -> RepositoryResult<u64>;
}
