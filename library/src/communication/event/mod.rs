//! Structures to realise an event-driven service architecture
//!
//! Notifications are stored in a log-like data structure of limited length
//! from which [`ConsumerGroups`](ConsumerGroupDescriptor) read. Every entry
//! delivered to a group has to be acknowledged once processing concludes;
//! until then it remains in the group's pending list. A consumer that
//! crashes mid-entry therefore receives the unacknowledged entries again
//! when its session restarts, before any new ones. Nothing is lost, at the
//! cost of potential redelivery, which is why consumers are expected to
//! process entries idempotently.
//!
//! Multiple consumers may share a group. Each entry is assigned to only one
//! consumer within the group, which effectively load balances the stream
//! across however many instances happen to be running.

mod consumer;
mod consumer_group;
mod notification;
mod publisher;
mod queue;
mod queue_provider;

pub use consumer::*;
pub use consumer_group::*;
pub use notification::*;
pub use publisher::*;
pub use queue::*;
pub use queue_provider::*;
