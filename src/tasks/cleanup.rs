//! Expiry Sweep Task
//!
//! Background task that periodically removes stale cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheManager, Clock};

/// Spawns a task that calls [`CacheManager::clean_expired`] every `interval`.
///
/// The cache never schedules this itself; the composition root decides
/// whether to run it. Abort the returned handle during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheManager::<serde_json::Value>::default());
/// let sweep = spawn_cleanup_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_cleanup_task<T, C>(
    cache: Arc<CacheManager<T, C>>,
    interval: Duration,
) -> JoinHandle<()>
where
    T: Send + 'static,
    C: Clock + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.clean_expired();
            if removed > 0 {
                info!(removed, "expiry sweep removed stale entries");
            } else {
                debug!("expiry sweep found nothing stale");
            }
        }
    })
}
