use super::handle::{HandleRegistration, SHARED_TASK_RESOURCE_HANDLES};
use multiplexed::SHARED_CONNECTION;
use redis::aio::ConnectionLike;
use redis::RedisError;
use tokio::task::yield_now;
use tracing::{error, trace};

mod conlike;
mod multiplexed;
mod owned;

/// Redis connection that monitors for connection errors
///
/// When a command fails with a connection-level error, the associated task
/// resource handle is notified so the owning job restarts with a fresh
/// connection instead of hammering a dead one.
pub struct RedisResource<C: ConnectionLike> {
    pub(super) con: C,
    pub(super) handle: HandleRegistration,
}

impl<C: ConnectionLike> RedisResource<C> {
    async fn notify(&mut self, error: &RedisError) {
        error!(?error, "Redis connection encountered error");

        self.handle.resource_died().await;

        if self.handle.is_shared {
            // Invalidate the shared connection
            trace!("Invalidating shared connection");
            *(SHARED_CONNECTION.lock().await) = None;

            // Notify all other task's handles that are using the shared connection
            trace!("Notifying sibling task handles");
            let handles = SHARED_TASK_RESOURCE_HANDLES.lock().await;
            for handle in handles.iter() {
                handle.clone().resource_died().await;
            }
        }

        yield_now().await;
    }
}
