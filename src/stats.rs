//! Core module containing the statistics types and shared infrastructure.
//!
//! This module provides the foundational types used across the crate: the
//! message [`Outcome`] classification, the [`ConsumerStatistics`] value type,
//! the [`StatValue`] unified observation value, the [`Observable`] trait that
//! statistics sources implement, and the thread-slot assignment used by the
//! sharded live counter.
//!
//! # Message Lifecycle
//!
//! Every message a consumer takes off the bus is counted exactly twice: once
//! on intake, and once with its terminal classification.
//!
//! ```text
//!                          ┌──────────────────────────────┐
//!   broker ──delivery──►   │  received                    │
//!                          └──────────────┬───────────────┘
//!                                         │ handler runs
//!                          ┌──────────────┴───────────────┐
//!                          │  exactly one of:             │
//!                          │    processed   (acked)       │
//!                          │    dropped     (filtered)    │
//!                          │    rejected    (nacked)      │
//!                          │    failed      (error)       │
//!                          └──────────────────────────────┘
//! ```
//!
//! # Ownership Model
//!
//! Each running consumer owns one statistics source. The pure
//! [`ConsumerStatistics`] value type is owned and mutated by a single
//! execution context; the sharded [`LiveStatistics`](live::LiveStatistics)
//! accumulator is safe to update from many handler threads. Aggregation
//! always works on snapshots: reading a source yields a copy, and combining
//! copies allocates a fresh value without touching shared state.
//!
//! # Thread Slot Assignment
//!
//! The live counter shards its storage across [`NUM_SLOTS`] cache-line-padded
//! slots. Slots are assigned to threads round-robin: the first thread gets
//! slot 0, the second slot 1, and so on, wrapping after 64 threads. The
//! assignment is deterministic and stable for the thread's lifetime.

pub mod consumer;
pub mod live;

use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

pub use consumer::ConsumerStatistics;
pub use live::{LiveStatistics, OutcomeView};

/// Number of shards (slots) used by the live counter.
///
/// Each slot is cache-line padded, so a live counter occupies
/// `64 slots × 64 bytes = 4KB`. Large enough that up to 64 threads record
/// outcomes without contending on a cache line, and a power of 2 for cheap
/// modulo.
pub(crate) const NUM_SLOTS: usize = 64;

/// Global counter for assigning slot IDs to threads.
static NEXT_SLOT_ID: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    /// Thread-local slot index assigned to the current thread.
    ///
    /// Initialized lazily on the thread's first counter operation and stable
    /// for the lifetime of the thread.
    pub(crate) static THREAD_SLOT_INDEX: usize = next_slot_id();
}

/// Assigns the next available slot ID to a thread.
///
/// Called once per thread (lazily) on its first counter operation. The
/// returned value is in the range `[0, NUM_SLOTS)`. Uses `Ordering::Relaxed`
/// because only atomicity matters here; two threads occasionally sharing a
/// slot increases contention slightly but stays correct.
pub(crate) fn next_slot_id() -> usize {
    NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed) % NUM_SLOTS
}

/// Terminal and intake classifications of a consumed message.
///
/// `Received` is recorded on intake; exactly one of the remaining four is
/// recorded when handling concludes. The declaration order here is the
/// canonical field order used by [`ConsumerStatistics::entries`] and the
/// string representation.
///
/// # Examples
///
/// ```rust
/// use statistiche::stats::Outcome;
///
/// assert_eq!(Outcome::Received.as_str(), "received");
/// assert_eq!("rejected".parse::<Outcome>().unwrap(), Outcome::Rejected);
/// assert_eq!(Outcome::ALL.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    /// The message was handed to the consumer.
    Received,
    /// The message was successfully handled.
    Processed,
    /// The message was discarded without processing (e.g. filtered).
    Dropped,
    /// The message was explicitly rejected (negative acknowledgement).
    Rejected,
    /// Processing raised an unrecoverable error.
    Failed,
}

impl Outcome {
    /// All outcomes, in canonical declaration order.
    pub const ALL: [Outcome; 5] = [
        Outcome::Received,
        Outcome::Processed,
        Outcome::Dropped,
        Outcome::Rejected,
        Outcome::Failed,
    ];

    /// Returns the lowercase field name of this outcome.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Outcome::Received => "received",
            Outcome::Processed => "processed",
            Outcome::Dropped => "dropped",
            Outcome::Rejected => "rejected",
            Outcome::Failed => "failed",
        }
    }

    /// Returns the positional index of this outcome in declaration order.
    #[inline]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = StatsError;

    /// Parses a lowercase field name into an outcome.
    ///
    /// Any name outside the fixed five-field set fails with
    /// [`StatsError::UnknownField`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(Outcome::Received),
            "processed" => Ok(Outcome::Processed),
            "dropped" => Ok(Outcome::Dropped),
            "rejected" => Ok(Outcome::Rejected),
            "failed" => Ok(Outcome::Failed),
            other => Err(StatsError::UnknownField {
                field: other.to_string(),
            }),
        }
    }
}

/// Errors reported by the statistics types.
///
/// Both variants are synchronous programming-contract violations. Neither is
/// retried or recovered internally; they surface immediately so that misuse
/// is caught during development rather than handled at runtime.
///
/// # Examples
///
/// ```rust
/// use statistiche::stats::{Outcome, StatsError};
///
/// let err = "dummy".parse::<Outcome>().unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "ConsumerStatistics does not have a dummy attribute. \
///      Available attributes: dropped, failed, processed, received, rejected."
/// );
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// A field name outside the fixed five-field set was used.
    ///
    /// The attribute list in the message is alphabetically sorted, not in
    /// declaration order.
    #[error(
        "ConsumerStatistics does not have a {field} attribute. \
         Available attributes: dropped, failed, processed, received, rejected."
    )]
    UnknownField {
        /// The offending field name.
        field: String,
    },

    /// A statistics value was added to something that is not one.
    #[error("ConsumerStatistics instances can only be added to other ConsumerStatistics instances.")]
    InvalidOperand,
}

/// The value observed from a statistics source.
///
/// Most sources yield a full [`ConsumerStatistics`] snapshot, but a
/// per-outcome view (see [`LiveStatistics::outcome`](live::LiveStatistics::outcome))
/// yields a bare count. This enum lets the [`Observable`] trait cover both
/// through one interface.
///
/// # Examples
///
/// ```rust
/// use statistiche::stats::{ConsumerStatistics, StatValue};
///
/// let full = StatValue::Statistics(ConsumerStatistics::new());
/// let scalar = StatValue::Count(42);
///
/// assert!(full.is_zero());
/// assert!(!scalar.is_zero());
/// assert!(full.checked_add(&scalar).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatValue {
    /// A full five-field statistics snapshot.
    Statistics(ConsumerStatistics),
    /// A single outcome total viewed in isolation.
    Count(u64),
}

impl StatValue {
    /// Returns `true` if every count in the value is zero.
    pub fn is_zero(&self) -> bool {
        match self {
            StatValue::Statistics(stats) => stats.is_zero(),
            StatValue::Count(v) => *v == 0,
        }
    }

    /// Returns the inner statistics snapshot, if this value holds one.
    pub fn as_statistics(&self) -> Option<&ConsumerStatistics> {
        match self {
            StatValue::Statistics(stats) => Some(stats),
            StatValue::Count(_) => None,
        }
    }

    /// Returns the inner scalar count, if this value holds one.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            StatValue::Statistics(_) => None,
            StatValue::Count(v) => Some(*v),
        }
    }

    /// Adds two observed values, allocating a fresh result.
    ///
    /// Two statistics snapshots sum field-wise; two scalar counts sum
    /// directly. Mixing the two kinds fails with
    /// [`StatsError::InvalidOperand`], since a bare count carries no field
    /// information to merge into a snapshot.
    pub fn checked_add(&self, other: &StatValue) -> Result<StatValue, StatsError> {
        match (self, other) {
            (StatValue::Statistics(a), StatValue::Statistics(b)) => {
                Ok(StatValue::Statistics(*a + *b))
            }
            (StatValue::Count(a), StatValue::Count(b)) => {
                Ok(StatValue::Count(a.saturating_add(*b)))
            }
            _ => Err(StatsError::InvalidOperand),
        }
    }
}

impl Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Statistics(stats) => write!(f, "{}", stats),
            StatValue::Count(v) => write!(f, "{}", v),
        }
    }
}

impl From<ConsumerStatistics> for StatValue {
    fn from(stats: ConsumerStatistics) -> Self {
        StatValue::Statistics(stats)
    }
}

impl From<u64> for StatValue {
    fn from(count: u64) -> Self {
        StatValue::Count(count)
    }
}

/// A trait for statistics sources that can be observed.
///
/// This is the common interface between producers (live counters, adapters)
/// and consumers of statistics (the registry and the observers). Reading a
/// source never blocks and always yields a copy; the source keeps
/// accumulating while the copy is aggregated elsewhere.
///
/// # Examples
///
/// ```rust
/// use statistiche::stats::{LiveStatistics, Observable, Outcome};
///
/// let stats = LiveStatistics::new().with_name("mailman");
/// stats.record(Outcome::Received);
/// stats.record(Outcome::Processed);
///
/// println!("{}", &stats as &dyn Observable);
/// ```
pub trait Observable: Debug {
    /// Returns the name of this source (typically the consumer name).
    ///
    /// Returns an empty string if no name was set.
    fn name(&self) -> &str;

    /// Returns the currently observed value.
    ///
    /// Reading a sharded source iterates all of its slots, making reads more
    /// expensive than writes. That is the right trade-off here: outcomes are
    /// recorded per message, statistics are read per reporting interval.
    fn value(&self) -> StatValue;

    /// Returns the currently observed value and resets the source.
    ///
    /// Each slot of a sharded source is reset atomically, but the aggregate
    /// across slots is not: outcomes recorded concurrently may land in either
    /// the returned value or the next collection period. For statistics this
    /// is acceptable.
    fn value_and_reset(&self) -> StatValue;

    /// Returns the labels attached to this source.
    ///
    /// Labels identify the consumer's place in the broker topology (queue,
    /// exchange, routing key). Sources without labels return an empty slice;
    /// the [`Labeled`](crate::adapters::Labeled) adapter overrides this.
    fn labels(&self) -> &[(String, String)] {
        &[]
    }
}

impl Display for dyn Observable + '_ {
    /// Formats the source as `name:value` if named, or just `value` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name().is_empty() {
            write!(f, "{}:{}", self.name(), self.value())
        } else {
            write!(f, "{}", self.value())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_order() {
        let names: Vec<&str> = Outcome::ALL.iter().map(|o| o.as_str()).collect();
        assert_eq!(
            names,
            vec!["received", "processed", "dropped", "rejected", "failed"]
        );
    }

    #[test]
    fn test_outcome_index() {
        for (i, outcome) in Outcome::ALL.iter().enumerate() {
            assert_eq!(outcome.index(), i);
        }
    }

    #[test]
    fn test_outcome_parse() {
        for outcome in Outcome::ALL {
            assert_eq!(outcome.as_str().parse::<Outcome>().unwrap(), outcome);
        }
    }

    #[test]
    fn test_outcome_parse_unknown() {
        let err = "dummy".parse::<Outcome>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "ConsumerStatistics does not have a dummy attribute. \
             Available attributes: dropped, failed, processed, received, rejected."
        );
    }

    #[test]
    fn test_unknown_field_message_is_sorted() {
        let mut sorted: Vec<&str> = Outcome::ALL.iter().map(|o| o.as_str()).collect();
        sorted.sort_unstable();
        let err = "nope".parse::<Outcome>().unwrap_err();
        assert!(err.to_string().ends_with(&format!(
            "Available attributes: {}.",
            sorted.join(", ")
        )));
    }

    #[test]
    fn test_invalid_operand_message() {
        assert_eq!(
            StatsError::InvalidOperand.to_string(),
            "ConsumerStatistics instances can only be added to other ConsumerStatistics instances."
        );
    }

    #[test]
    fn test_stat_value_is_zero() {
        assert!(StatValue::Count(0).is_zero());
        assert!(!StatValue::Count(1).is_zero());
        assert!(StatValue::Statistics(ConsumerStatistics::new()).is_zero());
    }

    #[test]
    fn test_stat_value_checked_add_counts() {
        let sum = StatValue::Count(2).checked_add(&StatValue::Count(3)).unwrap();
        assert_eq!(sum, StatValue::Count(5));
    }

    #[test]
    fn test_stat_value_checked_add_mixed() {
        let stats = StatValue::Statistics(ConsumerStatistics::new());
        let count = StatValue::Count(42);
        assert_eq!(
            stats.checked_add(&count).unwrap_err(),
            StatsError::InvalidOperand
        );
        assert_eq!(
            count.checked_add(&stats).unwrap_err(),
            StatsError::InvalidOperand
        );
    }

    #[test]
    fn test_stat_value_accessors() {
        let stats = StatValue::from(ConsumerStatistics::new());
        assert!(stats.as_statistics().is_some());
        assert!(stats.as_count().is_none());

        let count = StatValue::from(7u64);
        assert!(count.as_statistics().is_none());
        assert_eq!(count.as_count(), Some(7));
    }

    #[test]
    fn test_slot_id_range() {
        for _ in 0..NUM_SLOTS * 2 {
            assert!(next_slot_id() < NUM_SLOTS);
        }
    }
}
