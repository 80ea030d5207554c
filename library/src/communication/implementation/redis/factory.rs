use super::super::super::super::BoxedError;
use async_trait::async_trait;
use redis::aio::ConnectionLike;

/// Variant for redis connections
pub enum RedisConnectionVariant {
    /// Individual connection that may allow for blocking commands without disturbing other users.
    /// While it may be reused after going out-of-scope, this variant indicates that the consumer
    /// is operating long-running, blocking operations on the connection and the use of a resource pool is
    /// unadvisable as it may take a long time for the connection to be returned.
    Owned,
    /// Connection that can be shared between multiple users and generally does not permit blocking commands
    Multiplexed,
}

/// Factory for redis connections of different [types](RedisConnectionVariant)
#[async_trait]
pub trait RedisFactory {
    /// Establishes a new connection or clones a shared one
    async fn connection(
        &self,
        variant: RedisConnectionVariant,
    ) -> Result<Box<dyn ConnectionLike + Send + Sync>, BoxedError>;
}
