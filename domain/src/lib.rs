//! Domain data structures of the learning platform
//!
//! This crate contains everything specific to quizzes, courses and learner
//! progress. The generic messaging machinery it builds upon lives in the
//! `library` crate.

#![deny(missing_docs)]

pub mod event;

mod progress;

pub use progress::*;

/// Number of entries retained in queues that make up the quiz submission workflow.
///
/// Submission bursts are small (one entry per learner action) so even a modest
/// retention covers extended consumer downtime.
pub(crate) const QUEUE_SIZE_QUIZ_WORKFLOW: usize = 10_000;
