//! Structures for communication between services in a distributed system
//!
//! Services have no direct knowledge of each other. Whenever something
//! noteworthy happens, a [`Notification`](event::Notification) describing the
//! event is published to a durable queue and every interested party consumes
//! it from there at its own pace. Consumption is made reliable through
//! [consumer groups](event::ConsumerGroupDescriptor): entries are only
//! removed from a group's pending list once they have been acknowledged, so a
//! crashed consumer resumes exactly where it left off. See the [`event`]
//! module for the full story.

mod communication_factory;

pub mod event;
pub mod implementation;

pub use communication_factory::CommunicationFactory;
