//! The consumer statistics value type.
//!
//! This module provides [`ConsumerStatistics`], a plain value holding one
//! non-negative count per message lifecycle outcome. It is the unit of
//! exchange across the crate: live counters produce it as snapshots, the
//! registry folds it, observers render it.

use std::fmt::{self, Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Index};

use crate::stats::{Outcome, StatValue, StatsError};

/// Per-consumer message counts, one field per lifecycle outcome.
///
/// The field set is fixed and closed: `received`, `processed`, `dropped`,
/// `rejected`, `failed`, in that canonical order. Counts are `u64`, so
/// non-negativity holds by construction. The type is `Copy`; taking a
/// snapshot of a consumer's statistics is a plain copy.
///
/// A fresh instance is all-zero. The owning consumer's execution context
/// increments exactly one field per message outcome: `received` on intake,
/// then one of the remaining four as the terminal classification.
///
/// # Combining
///
/// Addition produces a fresh instance whose fields are the per-field sums of
/// the operands, leaving both operands untouched. This makes it safe to sum
/// snapshots taken from any number of consumers, from any thread:
///
/// ```rust
/// use statistiche::stats::ConsumerStatistics;
///
/// let mut a = ConsumerStatistics::new();
/// a.received = 42;
/// a.processed = 43;
///
/// let mut b = ConsumerStatistics::new();
/// b.received = 1;
/// b.processed = 2;
/// b.dropped = 10;
///
/// let combined = a + b;
/// assert_eq!(combined.received, 43);
/// assert_eq!(combined.processed, 45);
/// assert_eq!(combined.dropped, 10);
/// // operands are unchanged
/// assert_eq!(a.received, 42);
/// assert_eq!(b.dropped, 10);
/// ```
///
/// # Representation
///
/// `Display` and `Debug` are identical and byte-stable:
///
/// ```rust
/// use statistiche::stats::ConsumerStatistics;
///
/// let stats = ConsumerStatistics::new();
/// assert_eq!(
///     stats.to_string(),
///     "<ConsumerStatistics {'received': 0, 'processed': 0, 'dropped': 0, \
///      'rejected': 0, 'failed': 0}>"
/// );
/// ```
///
/// # Thread Safety
///
/// The type holds no synchronization. A single instance must be mutated from
/// one execution context only; for lock-free concurrent recording use
/// [`LiveStatistics`](crate::stats::LiveStatistics) and take snapshots.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumerStatistics {
    /// Messages handed to the consumer.
    pub received: u64,
    /// Messages successfully handled.
    pub processed: u64,
    /// Messages discarded without processing (e.g. filtered).
    pub dropped: u64,
    /// Messages explicitly rejected (negative acknowledgement).
    pub rejected: u64,
    /// Messages whose processing raised an unrecoverable error.
    pub failed: u64,
}

impl ConsumerStatistics {
    /// Creates a new instance with all five counts set to zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statistiche::stats::ConsumerStatistics;
    ///
    /// let stats = ConsumerStatistics::new();
    /// assert!(stats.is_zero());
    /// ```
    pub const fn new() -> Self {
        ConsumerStatistics {
            received: 0,
            processed: 0,
            dropped: 0,
            rejected: 0,
            failed: 0,
        }
    }

    /// Returns the count for the given outcome.
    #[inline]
    pub const fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Received => self.received,
            Outcome::Processed => self.processed,
            Outcome::Dropped => self.dropped,
            Outcome::Rejected => self.rejected,
            Outcome::Failed => self.failed,
        }
    }

    /// Sets the count for the given outcome.
    #[inline]
    pub fn set(&mut self, outcome: Outcome, value: u64) {
        *self.slot_mut(outcome) = value;
    }

    /// Adds `value` to the count for the given outcome, saturating at
    /// `u64::MAX`.
    #[inline]
    pub fn add(&mut self, outcome: Outcome, value: u64) {
        let slot = self.slot_mut(outcome);
        *slot = slot.saturating_add(value);
    }

    /// Records one occurrence of the given outcome.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statistiche::stats::{ConsumerStatistics, Outcome};
    ///
    /// let mut stats = ConsumerStatistics::new();
    /// stats.record(Outcome::Received);
    /// stats.record(Outcome::Processed);
    /// assert_eq!(stats.received, 1);
    /// assert_eq!(stats.processed, 1);
    /// ```
    #[inline]
    pub fn record(&mut self, outcome: Outcome) {
        self.add(outcome, 1);
    }

    /// Returns the count for a field addressed by name.
    ///
    /// Names outside the fixed five-field set fail with
    /// [`StatsError::UnknownField`].
    pub fn get_named(&self, name: &str) -> Result<u64, StatsError> {
        Ok(self.get(name.parse::<Outcome>()?))
    }

    /// Sets the count for a field addressed by name.
    ///
    /// This is the runtime-checked mutation path for callers working from
    /// dynamic data (parsed exports, management commands). Names outside the
    /// fixed five-field set fail with [`StatsError::UnknownField`]:
    ///
    /// ```rust
    /// use statistiche::stats::ConsumerStatistics;
    ///
    /// let mut stats = ConsumerStatistics::new();
    /// stats.set_named("received", 42).unwrap();
    /// assert_eq!(stats.received, 42);
    ///
    /// let err = stats.set_named("dummy", 42).unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     "ConsumerStatistics does not have a dummy attribute. \
    ///      Available attributes: dropped, failed, processed, received, rejected."
    /// );
    /// ```
    pub fn set_named(&mut self, name: &str, value: u64) -> Result<(), StatsError> {
        self.set(name.parse::<Outcome>()?, value);
        Ok(())
    }

    /// Returns the five counts paired with their outcomes, in canonical
    /// declaration order.
    ///
    /// This is the structured export used for serialization and logging:
    ///
    /// ```rust
    /// use statistiche::stats::{ConsumerStatistics, Outcome};
    ///
    /// let mut stats = ConsumerStatistics::new();
    /// stats.received = 3;
    ///
    /// let entries = stats.entries();
    /// assert_eq!(entries[0], (Outcome::Received, 3));
    /// assert_eq!(entries[4], (Outcome::Failed, 0));
    /// ```
    pub fn entries(&self) -> [(Outcome, u64); 5] {
        [
            (Outcome::Received, self.received),
            (Outcome::Processed, self.processed),
            (Outcome::Dropped, self.dropped),
            (Outcome::Rejected, self.rejected),
            (Outcome::Failed, self.failed),
        ]
    }

    /// Builds an instance from exported name/value pairs.
    ///
    /// Missing fields stay zero; repeated names overwrite. Unknown names
    /// fail with [`StatsError::UnknownField`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statistiche::stats::ConsumerStatistics;
    ///
    /// let stats =
    ///     ConsumerStatistics::from_entries([("received", 10), ("failed", 1)]).unwrap();
    /// assert_eq!(stats.received, 10);
    /// assert_eq!(stats.failed, 1);
    /// assert_eq!(stats.processed, 0);
    ///
    /// assert!(ConsumerStatistics::from_entries([("dummy", 1)]).is_err());
    /// ```
    pub fn from_entries<I, S>(entries: I) -> Result<Self, StatsError>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut stats = ConsumerStatistics::new();
        for (name, value) in entries {
            stats.set_named(name.as_ref(), value)?;
        }
        Ok(stats)
    }

    /// Returns `true` if every count is zero.
    pub const fn is_zero(&self) -> bool {
        self.received == 0
            && self.processed == 0
            && self.dropped == 0
            && self.rejected == 0
            && self.failed == 0
    }

    /// Adds an observed value, allocating a fresh result.
    ///
    /// This is the dynamic counterpart of `+` for callers folding
    /// [`StatValue`]s of unknown kind. A scalar operand carries no field
    /// information and fails with [`StatsError::InvalidOperand`]:
    ///
    /// ```rust
    /// use statistiche::stats::{ConsumerStatistics, StatValue};
    ///
    /// let stats = ConsumerStatistics::new();
    /// let err = stats.checked_add(&StatValue::Count(42)).unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     "ConsumerStatistics instances can only be added to other \
    ///      ConsumerStatistics instances."
    /// );
    /// ```
    pub fn checked_add(&self, value: &StatValue) -> Result<ConsumerStatistics, StatsError> {
        match value {
            StatValue::Statistics(other) => Ok(*self + *other),
            StatValue::Count(_) => Err(StatsError::InvalidOperand),
        }
    }

    #[inline]
    fn slot_mut(&mut self, outcome: Outcome) -> &mut u64 {
        match outcome {
            Outcome::Received => &mut self.received,
            Outcome::Processed => &mut self.processed,
            Outcome::Dropped => &mut self.dropped,
            Outcome::Rejected => &mut self.rejected,
            Outcome::Failed => &mut self.failed,
        }
    }
}

impl Add for ConsumerStatistics {
    type Output = ConsumerStatistics;

    /// Per-field saturating sum, producing a fresh instance.
    fn add(self, rhs: ConsumerStatistics) -> ConsumerStatistics {
        ConsumerStatistics {
            received: self.received.saturating_add(rhs.received),
            processed: self.processed.saturating_add(rhs.processed),
            dropped: self.dropped.saturating_add(rhs.dropped),
            rejected: self.rejected.saturating_add(rhs.rejected),
            failed: self.failed.saturating_add(rhs.failed),
        }
    }
}

impl Add for &ConsumerStatistics {
    type Output = ConsumerStatistics;

    fn add(self, rhs: &ConsumerStatistics) -> ConsumerStatistics {
        *self + *rhs
    }
}

impl AddAssign for ConsumerStatistics {
    fn add_assign(&mut self, rhs: ConsumerStatistics) {
        *self = *self + rhs;
    }
}

impl Sum for ConsumerStatistics {
    fn sum<I: Iterator<Item = ConsumerStatistics>>(iter: I) -> ConsumerStatistics {
        iter.fold(ConsumerStatistics::new(), Add::add)
    }
}

impl Index<Outcome> for ConsumerStatistics {
    type Output = u64;

    fn index(&self, outcome: Outcome) -> &u64 {
        match outcome {
            Outcome::Received => &self.received,
            Outcome::Processed => &self.processed,
            Outcome::Dropped => &self.dropped,
            Outcome::Rejected => &self.rejected,
            Outcome::Failed => &self.failed,
        }
    }
}

impl Display for ConsumerStatistics {
    /// Renders the canonical representation, e.g.
    /// `<ConsumerStatistics {'received': 1, 'processed': 1, 'dropped': 0,
    /// 'rejected': 0, 'failed': 0}>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ConsumerStatistics {{")?;
        for (i, (outcome, value)) in self.entries().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}': {}", outcome, value)?;
        }
        write!(f, "}}>")
    }
}

impl Debug for ConsumerStatistics {
    /// Identical to `Display`; the representation is canonical either way.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero() {
        let stats = ConsumerStatistics::new();
        for (_, value) in stats.entries() {
            assert_eq!(value, 0);
        }
        assert!(stats.is_zero());
    }

    #[test]
    fn test_repr() {
        let expected = "<ConsumerStatistics {'received': 0, 'processed': 0, 'dropped': 0, 'rejected': 0, 'failed': 0}>";
        assert_eq!(format!("{}", ConsumerStatistics::new()), expected);
        assert_eq!(format!("{:?}", ConsumerStatistics::new()), expected);
    }

    #[test]
    fn test_repr_with_values() {
        let mut stats = ConsumerStatistics::new();
        stats.received = 7;
        stats.failed = 2;
        assert_eq!(
            stats.to_string(),
            "<ConsumerStatistics {'received': 7, 'processed': 0, 'dropped': 0, 'rejected': 0, 'failed': 2}>"
        );
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let mut stats = ConsumerStatistics::new();
        for (i, outcome) in Outcome::ALL.iter().enumerate() {
            stats.set(*outcome, i as u64 * 10);
        }
        for (i, outcome) in Outcome::ALL.iter().enumerate() {
            assert_eq!(stats.get(*outcome), i as u64 * 10);
            assert_eq!(stats[*outcome], i as u64 * 10);
        }
    }

    #[test]
    fn test_named_roundtrip() {
        let mut stats = ConsumerStatistics::new();
        for outcome in Outcome::ALL {
            stats.set_named(outcome.as_str(), 5).unwrap();
            assert_eq!(stats.get_named(outcome.as_str()).unwrap(), 5);
        }
    }

    #[test]
    fn test_set_named_unknown() {
        let mut stats = ConsumerStatistics::new();
        let err = stats.set_named("dummy", 42).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ConsumerStatistics does not have a dummy attribute. \
             Available attributes: dropped, failed, processed, received, rejected."
        );
        // the failed write left nothing behind
        assert!(stats.is_zero());
    }

    #[test]
    fn test_get_named_unknown() {
        let err = ConsumerStatistics::new().get_named("total").unwrap_err();
        assert!(matches!(err, StatsError::UnknownField { field } if field == "total"));
    }

    #[test]
    fn test_add() {
        let mut a = ConsumerStatistics::new();
        a.received = 42;
        a.processed = 43;

        let mut b = ConsumerStatistics::new();
        b.received = 1;
        b.processed = 2;
        b.dropped = 10;

        let combined = a + b;
        assert_eq!(
            combined.entries().map(|(_, v)| v),
            [43, 45, 10, 0, 0]
        );
    }

    #[test]
    fn test_add_does_not_mutate_operands() {
        let mut a = ConsumerStatistics::new();
        a.rejected = 3;
        let mut b = ConsumerStatistics::new();
        b.failed = 4;

        let _ = a + b;
        assert_eq!(a.rejected, 3);
        assert_eq!(a.failed, 0);
        assert_eq!(b.failed, 4);
        assert_eq!(b.rejected, 0);
    }

    #[test]
    fn test_add_commutative() {
        let a = ConsumerStatistics::from_entries([("received", 5), ("dropped", 1)]).unwrap();
        let b = ConsumerStatistics::from_entries([("received", 2), ("failed", 9)]).unwrap();
        assert_eq!(a + b, b + a);
    }

    #[test]
    fn test_add_associative() {
        let a = ConsumerStatistics::from_entries([("received", 1)]).unwrap();
        let b = ConsumerStatistics::from_entries([("processed", 2)]).unwrap();
        let c = ConsumerStatistics::from_entries([("rejected", 3)]).unwrap();
        assert_eq!((a + b) + c, a + (b + c));
    }

    #[test]
    fn test_add_by_ref() {
        let a = ConsumerStatistics::from_entries([("received", 1)]).unwrap();
        let b = ConsumerStatistics::from_entries([("received", 2)]).unwrap();
        assert_eq!((&a + &b).received, 3);
    }

    #[test]
    fn test_add_assign() {
        let mut a = ConsumerStatistics::new();
        a.received = 1;
        let mut b = ConsumerStatistics::new();
        b.received = 2;
        a += b;
        assert_eq!(a.received, 3);
    }

    #[test]
    fn test_add_saturates() {
        let mut a = ConsumerStatistics::new();
        a.received = u64::MAX;
        let mut b = ConsumerStatistics::new();
        b.received = 1;
        assert_eq!((a + b).received, u64::MAX);
    }

    #[test]
    fn test_sum() {
        let parts = vec![
            ConsumerStatistics::from_entries([("received", 1), ("processed", 1)]).unwrap(),
            ConsumerStatistics::from_entries([("received", 1), ("dropped", 1)]).unwrap(),
            ConsumerStatistics::from_entries([("received", 1), ("failed", 1)]).unwrap(),
        ];
        let total: ConsumerStatistics = parts.into_iter().sum();
        assert_eq!(total.received, 3);
        assert_eq!(total.processed, 1);
        assert_eq!(total.dropped, 1);
        assert_eq!(total.failed, 1);
    }

    #[test]
    fn test_checked_add_statistics() {
        let a = ConsumerStatistics::from_entries([("received", 1)]).unwrap();
        let b = ConsumerStatistics::from_entries([("received", 2)]).unwrap();
        let sum = a.checked_add(&StatValue::Statistics(b)).unwrap();
        assert_eq!(sum.received, 3);
    }

    #[test]
    fn test_checked_add_bad_type() {
        let err = ConsumerStatistics::new()
            .checked_add(&StatValue::Count(42))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "ConsumerStatistics instances can only be added to other ConsumerStatistics instances."
        );
    }

    #[test]
    fn test_record() {
        let mut stats = ConsumerStatistics::new();
        stats.record(Outcome::Received);
        stats.record(Outcome::Received);
        stats.record(Outcome::Rejected);
        assert_eq!(stats.received, 2);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_entries_order() {
        let outcomes: Vec<Outcome> = ConsumerStatistics::new()
            .entries()
            .iter()
            .map(|(o, _)| *o)
            .collect();
        assert_eq!(outcomes, Outcome::ALL.to_vec());
    }

    #[test]
    fn test_from_entries_overwrites() {
        let stats =
            ConsumerStatistics::from_entries([("received", 1), ("received", 9)]).unwrap();
        assert_eq!(stats.received, 9);
    }

    #[test]
    fn test_default() {
        assert_eq!(ConsumerStatistics::default(), ConsumerStatistics::new());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_field_order() {
        let mut stats = ConsumerStatistics::new();
        stats.received = 43;
        stats.processed = 45;
        stats.dropped = 10;
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"received":43,"processed":45,"dropped":10,"rejected":0,"failed":0}"#
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize() {
        let stats: ConsumerStatistics =
            serde_json::from_str(r#"{"received":1,"processed":2,"dropped":0,"rejected":0,"failed":0}"#)
                .unwrap();
        assert_eq!(stats.received, 1);
        assert_eq!(stats.processed, 2);
    }
}
