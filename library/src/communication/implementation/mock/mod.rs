//! Mock implementations for use in unit tests

mod factory;
mod notification_publisher;

// Unimplemented modules
mod queue_provider;

use queue_provider::MockQueueProvider;

pub use factory::*;
pub use notification_publisher::*;

#[derive(Clone, PartialEq, Eq)]
pub enum ExpectationMode {
    /// No validity checks of any sort, just a dummy
    Ignore,
    /// Only allows expected items and requires all of them
    ExpectOnlyProvided,
    /// Allows intermittent noise but still requires all expected
    /// items to eventually be published
    AllowNoise,
}
