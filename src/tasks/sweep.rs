//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries from both
//! caches. Lookups already hide and drop expired entries on their own; the
//! sweep only bounds the memory held by keys nobody asks for again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CalendarCache, SearchCache};

/// Spawns a task that purges expired entries every `interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweep_task(state.search_cache.clone(), state.calendar_cache.clone(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(
    search_cache: Arc<SearchCache>,
    calendar_cache: Arc<CalendarCache>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!("Starting expiry sweep with interval of {} seconds", interval_secs);

        loop {
            tokio::time::sleep(interval).await;

            let search_removed = search_cache.purge_expired();
            let calendar_removed = calendar_cache.purge_expired();

            if search_removed + calendar_removed > 0 {
                info!(
                    search = search_removed,
                    calendar = calendar_removed,
                    "expiry sweep removed expired entries"
                );
            } else {
                debug!("expiry sweep: no expired entries found");
            }
        }
    })
}
