//! Various small helper functions

use std::num::ParseIntError;
use std::{iter::Iterator, time::Duration};

/// Parses a Duration from a string containing seconds.
/// Useful for command line parsing
pub fn parse_seconds(src: &str) -> Result<Duration, ParseIntError> {
    let seconds = src.parse::<u64>()?;
    Ok(Duration::from_secs(seconds))
}

/// Exponential backoff iterator
///
/// This struct implements the iterator trait and returns monotonically non-decreasing values
/// until a specified limit of iterations, specified by the `limit` field, is reached.
/// Each element in the Iterator is the previous element multiplied by the `multiplier`
/// property, clamped to the `ceiling`.
pub struct Backoff {
    retries: u32,
    limit: u32,
    multiplier: u32,
    ceiling: Duration,
    current: Duration,
}

impl Backoff {
    /// Creates a new instance from raw parts
    pub fn new(initial: Duration, multiplier: u32, ceiling: Duration, limit: u32) -> Self {
        Self {
            retries: 0,
            limit,
            multiplier,
            ceiling,
            current: initial,
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(50), 2, Duration::from_secs(30), 13)
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        self.retries += 1;

        if self.retries > self.limit {
            None
        } else {
            let delay = self.current.min(self.ceiling);
            self.current = (delay * self.multiplier).min(self.ceiling);
            Some(delay)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_monotonically_non_decreasing() {
        let mut backoff = Backoff::default();
        let mut previous = Duration::default();

        while let Some(duration) = backoff.next() {
            assert!(previous <= duration);
            previous = duration;
        }
    }

    #[test]
    fn backoff_yields_the_initial_value_first() {
        let mut backoff = Backoff::new(Duration::from_secs(1), 2, Duration::from_secs(10), 4);
        assert_eq!(backoff.next(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn backoff_doubles_until_the_ceiling() {
        let delays: Vec<_> =
            Backoff::new(Duration::from_secs(1), 2, Duration::from_secs(10), 6).collect();

        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(10),
                Duration::from_secs(10),
            ]
        );
    }

    #[test]
    fn backoff_respects_the_iteration_limit() {
        let backoff = Backoff::new(Duration::from_secs(1), 2, Duration::from_secs(10), 4);
        assert_eq!(backoff.count(), 4);
    }
}
