//! TTL Expiration Task
//!
//! Background task that sleeps until the soonest expiry and evicts expired
//! cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, trace};

use crate::cache::{NextExpiry, Shared};
use crate::config::CacheConfig;

/// Spawns the task that evicts entries as their TTL elapses.
///
/// Each iteration peeks the front of the expiry queue to decide how long to
/// wait:
/// - empty queue: no timer, wait for a mutation signal only
/// - only permanent entries: `config.idle_recheck`
/// - soonest expiry already passed: `config.min_wait`
/// - otherwise: until that expiry
///
/// The wait races against the mutation signal. If the timer wins, expired
/// entries are swept; if a mutation arrives first, the wait is recomputed.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted when the owning cache drops.
pub(crate) fn spawn_expiration_task<V>(
    shared: Arc<Shared<V>>,
    config: &CacheConfig,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    let idle_recheck = config.idle_recheck;
    let min_wait = config.min_wait;

    tokio::spawn(async move {
        info!(
            "Starting TTL expiration task with idle recheck of {:?}",
            idle_recheck
        );

        loop {
            let next = shared.store.read().await.next_expiry();
            let wait = match next {
                NextExpiry::Empty => {
                    trace!("Expiry queue empty, waiting for a mutation");
                    shared.signal.notified().await;
                    continue;
                }
                NextExpiry::Never => idle_recheck,
                NextExpiry::At(expires_at) => wait_until(expires_at, min_wait),
            };
            trace!("Next expiration check in {:?}", wait);

            tokio::select! {
                _ = time::sleep(wait) => {
                    let removed = shared.store.write().await.evict_expired();
                    if removed > 0 {
                        info!("TTL sweep: removed {} expired entries", removed);
                    } else {
                        debug!("TTL sweep: no expired entries found");
                    }
                }
                _ = shared.signal.notified() => {
                    trace!("Cache mutated, rescheduling expiration");
                }
            }
        }
    })
}

fn wait_until(expires_at: Instant, min_wait: Duration) -> Duration {
    expires_at
        .saturating_duration_since(Instant::now())
        .max(min_wait)
}
