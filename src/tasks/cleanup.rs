//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries from a store.
//! Stores used from threads without a runtime get no eviction timers, so this
//! sweep is what bounds their memory.

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task only holds a weak reference and exits on its own once every
/// handle to the store has been dropped.
///
/// # Panics
/// Must be called from within a tokio runtime.
///
/// # Example
/// ```ignore
/// let store = CacheStore::new();
/// let sweep = spawn_cleanup_task(&store, Duration::from_secs(1));
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_cleanup_task<K, R>(store: &CacheStore<K, R>, interval: Duration) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    let weak = store.downgrade();

    tokio::spawn(async move {
        info!("Starting expiry sweep with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let Some(store) = weak.upgrade() else {
                debug!("Store dropped, stopping expiry sweep");
                break;
            };

            let removed = store.cleanup_expired();
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
