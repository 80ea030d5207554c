//! Events occurring during the lifecycle of a quiz

mod submitted;

pub use submitted::*;
