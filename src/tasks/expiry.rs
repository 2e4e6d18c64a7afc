//! Eviction Timer
//!
//! One-shot background task that drops a memoized entry once its max age has
//! elapsed.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::trace;

/// Spawns a task on the current tokio runtime that runs `on_fire` after
/// `delay`.
///
/// Returns None when the calling thread has no runtime; expiry then relies on
/// the lookup-time check alone. The task never keeps the runtime alive and is
/// cancelled through the returned handle.
pub fn spawn_eviction_timer<F>(delay: Duration, on_fire: F) -> Option<AbortHandle>
where
    F: FnOnce() + Send + 'static,
{
    let Ok(runtime) = Handle::try_current() else {
        trace!("No tokio runtime, skipping eviction timer");
        return None;
    };

    let task = runtime.spawn(async move {
        tokio::time::sleep(delay).await;
        on_fire();
    });

    Some(task.abort_handle())
}
