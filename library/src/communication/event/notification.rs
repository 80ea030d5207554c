use super::QueueDescriptor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Entity to notify other services about an event that took place
///
/// Implementations serialize to the exact wire payload. There is no frame
/// or envelope around a notification and no schema version field, so changes
/// to an implementation have to remain compatible with already-queued
/// messages.
pub trait Notification: Serialize + DeserializeOwned + PartialEq + Debug {
    /// Queue on which this implementation can be sent and received
    fn queue() -> QueueDescriptor;
}
