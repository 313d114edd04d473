//! Periodic cache and ledger maintenance.
//!
//! Each tick sweeps expired cache entries (recording sweep metrics) and
//! purges pending operations older than the orphan window together with
//! their patches — the safety net for mutations whose resolution never
//! arrived. The task runs until the owning store's cancellation token fires.

use super::StoreInner;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

pub(crate) fn spawn(
    inner: Arc<RwLock<StoreInner>>,
    interval: Duration,
    orphan_age: chrono::Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately: an initial sweep, then the cadence.
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("janitor stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let mut guard = inner.write().await;
                    let stats = guard.cache.sweep(Instant::now());
                    let purged = guard.ledger.purge_older_than(chrono::Utc::now() - orphan_age);
                    drop(guard);

                    if stats.removed > 0 || purged > 0 {
                        debug!(
                            checked = stats.checked,
                            expired = stats.removed,
                            orphans = purged,
                            "janitor sweep"
                        );
                    } else {
                        trace!(checked = stats.checked, "janitor sweep: nothing to remove");
                    }
                }
            }
        }
    })
}
