//! Windowed wrapper for per-interval statistics collection.
//!
//! This module provides [`Windowed`], a wrapper that drains its inner source
//! on every read. A coordinating component collecting from a windowed source
//! sees only what happened since the previous collection, which is the shape
//! reporting loops usually want ("messages this interval" rather than
//! "messages since the consumer started").
//!
//! # Example
//!
//! ```rust
//! use statistiche::stats::{LiveStatistics, Observable, Outcome};
//! use statistiche::adapters::Windowed;
//!
//! let consumer = Windowed::new(LiveStatistics::new().with_name("mailman"));
//! consumer.record(Outcome::Received);
//! consumer.record(Outcome::Processed);
//!
//! // the first read drains the interval
//! let first = consumer.value().as_statistics().copied().unwrap();
//! assert_eq!(first.received, 1);
//!
//! // the next interval starts empty
//! assert!(consumer.value().is_zero());
//! ```

use crate::stats::{Observable, StatValue};
use std::fmt::{self, Debug};
use std::ops::Deref;

/// A wrapper that makes every read return the delta since the previous read.
///
/// `value()` and `value_and_reset()` behave identically: both drain the
/// inner source. Cumulative totals, if needed, belong to a separate unwrapped
/// source or to the aggregating side.
///
/// # Example
///
/// ```rust
/// use statistiche::stats::{LiveStatistics, Observable, Outcome};
/// use statistiche::adapters::Windowed;
///
/// let consumer = Windowed::new(LiveStatistics::new().with_name("mailman"));
///
/// consumer.add(Outcome::Received, 100);
/// assert!(!consumer.value().is_zero()); // interval 1: 100 received
///
/// consumer.add(Outcome::Received, 25);
/// let delta = consumer.value().as_statistics().copied().unwrap();
/// assert_eq!(delta.received, 25);       // interval 2: just the delta
/// ```
pub struct Windowed<T> {
    inner: T,
}

impl<T> Windowed<T> {
    /// Creates a new windowed wrapper around the given source.
    pub const fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Returns a reference to the inner source.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consumes the wrapper and returns the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Observable> Observable for Windowed<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    /// Returns the counts recorded since the previous read and resets them.
    fn value(&self) -> StatValue {
        self.inner.value_and_reset()
    }

    fn value_and_reset(&self) -> StatValue {
        self.inner.value_and_reset()
    }

    fn labels(&self) -> &[(String, String)] {
        self.inner.labels()
    }
}

impl<T> Deref for Windowed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Debug> Debug for Windowed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{LiveStatistics, Outcome};

    #[test]
    fn test_value_drains() {
        let consumer = Windowed::new(LiveStatistics::new());
        consumer.add(Outcome::Received, 100);

        let first = consumer.value().as_statistics().copied().unwrap();
        assert_eq!(first.received, 100);
        assert!(consumer.value().is_zero());
    }

    #[test]
    fn test_consecutive_intervals_see_only_deltas() {
        let consumer = Windowed::new(LiveStatistics::new());

        consumer.add(Outcome::Received, 100);
        let _ = consumer.value();

        consumer.add(Outcome::Received, 25);
        consumer.record(Outcome::Failed);

        let delta = consumer.value().as_statistics().copied().unwrap();
        assert_eq!(delta.received, 25);
        assert_eq!(delta.failed, 1);
    }

    #[test]
    fn test_value_and_reset_identical() {
        let consumer = Windowed::new(LiveStatistics::new());
        consumer.add(Outcome::Processed, 3);

        let v = consumer.value_and_reset().as_statistics().copied().unwrap();
        assert_eq!(v.processed, 3);
        assert!(consumer.value_and_reset().is_zero());
    }

    #[test]
    fn test_name_forwarding() {
        let consumer = Windowed::new(LiveStatistics::new().with_name("mailman"));
        assert_eq!(consumer.name(), "mailman");
    }

    #[test]
    fn test_deref() {
        let consumer = Windowed::new(LiveStatistics::new());
        consumer.record(Outcome::Dropped);
        assert_eq!(consumer.total(Outcome::Dropped), 1);
    }
}
