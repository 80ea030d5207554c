//! Independent and project agnostic libraries
//!
//! Everything in this crate could, in principle, be extracted and reused by
//! another project. It provides the messaging abstractions the services are
//! built on and a couple of small helpers. Anything specific to the learning
//! platform domain lives in the `domain` crate instead.

pub mod communication;
pub mod helpers;

/// Generic error type
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result with no value and a [`BoxedError`]
pub type EmptyResult = Result<(), BoxedError>;
