//! Monitored redis connections and the communication factory built on them
//!
//! Connections created here report their own failure through a
//! [`TaskResourceHandle`](jatsl::TaskResourceHandle) so the job that owns
//! them gets torn down and restarted by its scheduler. That restart loop is
//! the sole reconnect mechanism; no component ever retries a dead
//! connection in place.

mod factory;
mod handle;
mod resource;

pub use factory::*;
pub use resource::RedisResource;
