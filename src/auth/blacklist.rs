// Blacklist maintenance
// Expired entries are useless (the token's own exp already rejects it), so
// they are pruned periodically in the background

use chrono::{DateTime, Duration as ChronoDuration, SubsecRound, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::domain::repositories::{RepositoryResult, TokenBlacklist};

/// Latest expiry that no longer passes token validation at `now`
///
/// `exp` is checked in whole seconds with no leeway, so a token stays valid
/// through the second it expires in. Entries are kept one second past that.
pub fn prune_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(0) - ChronoDuration::seconds(1)
}

/// Removes blacklist entries whose token has already expired
pub async fn prune_once(blacklist: &dyn TokenBlacklist) -> RepositoryResult<u64> {
    let removed = blacklist.prune_expired(prune_cutoff(Utc::now())).await?;
    if removed > 0 {
        tracing::info!(removed, "Pruned expired blacklisted tokens");
    } else {
        tracing::debug!("No expired blacklisted tokens to prune");
    }
    Ok(removed)
}

/// Spawns a task that prunes the blacklist every `every`
///
/// Failures are logged and retried on the next tick.
pub fn spawn_pruner(blacklist: Arc<dyn TokenBlacklist>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = prune_once(blacklist.as_ref()).await {
                tracing::warn!(error = %e, "Blacklist pruning failed");
            }
        }
    })
}
