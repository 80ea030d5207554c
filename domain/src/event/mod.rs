//! Notifications published when something noteworthy happens on the platform

mod quiz;

pub use quiz::*;
