//! Lock-free statistics accumulator with sharded atomic storage.
//!
//! This module provides [`LiveStatistics`], the statistics source a running
//! consumer owns. Unlike the pure [`ConsumerStatistics`] value type, it may
//! be updated from many handler threads concurrently: storage is sharded
//! across cache-line-padded slots so threads recording outcomes do not
//! contend on the same cache line.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

use crate::stats::{
    ConsumerStatistics, Observable, Outcome, StatValue, NUM_SLOTS, THREAD_SLOT_INDEX,
};

const NUM_OUTCOMES: usize = Outcome::ALL.len();

/// One shard: one atomic count per outcome, padded to its own cache line.
struct Slot {
    counts: [AtomicU64; NUM_OUTCOMES],
}

impl Slot {
    const fn new() -> Self {
        const ZERO: AtomicU64 = AtomicU64::new(0);
        Slot {
            counts: [ZERO; NUM_OUTCOMES],
        }
    }
}

/// A thread-safe statistics accumulator for one consumer.
///
/// Each consumer instance owns one `LiveStatistics`. Handler threads record
/// message outcomes lock-free; the coordinating side takes
/// [`snapshot`](LiveStatistics::snapshot)s and combines them with the pure
/// addition on [`ConsumerStatistics`].
///
/// Storage is sharded across 64 cache-line-padded slots; each thread writes
/// only its assigned slot, and reads aggregate all slots. All atomic
/// operations use `Ordering::Relaxed` since counts need atomicity, not
/// ordering against other memory operations.
///
/// # Memory Usage
///
/// Each `LiveStatistics` uses 64 slots × one cache line = 4KB. The trade-off
/// is deliberate: a consumer records an outcome per message, but its
/// statistics are read once per reporting interval.
///
/// # Examples
///
/// ```rust
/// use statistiche::stats::{LiveStatistics, Outcome};
///
/// let stats = LiveStatistics::new().with_name("mailman");
/// stats.record(Outcome::Received);
/// stats.record(Outcome::Processed);
///
/// let snapshot = stats.snapshot();
/// assert_eq!(snapshot.received, 1);
/// assert_eq!(snapshot.processed, 1);
/// ```
///
/// Multi-threaded recording:
///
/// ```rust
/// use statistiche::stats::{LiveStatistics, Outcome};
/// use std::sync::Arc;
/// use std::thread;
///
/// let stats = Arc::new(LiveStatistics::new());
/// let mut handles = vec![];
///
/// for _ in 0..4 {
///     let s = Arc::clone(&stats);
///     handles.push(thread::spawn(move || {
///         for _ in 0..1000 {
///             s.record(Outcome::Received);
///             s.record(Outcome::Processed);
///         }
///     }));
/// }
///
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// assert_eq!(stats.snapshot().received, 4000);
/// assert_eq!(stats.snapshot().processed, 4000);
/// ```
pub struct LiveStatistics {
    name: &'static str,
    slots: [CachePadded<Slot>; NUM_SLOTS],
}

impl LiveStatistics {
    /// Creates a new accumulator with every count at zero.
    pub const fn new() -> Self {
        const ZERO_SLOT: CachePadded<Slot> = CachePadded::new(Slot::new());
        LiveStatistics {
            name: "",
            slots: [ZERO_SLOT; NUM_SLOTS],
        }
    }

    /// Sets the name of this accumulator, returning `self` for chaining.
    ///
    /// The name identifies the consumer in exports and aggregated views.
    pub const fn with_name(self, name: &'static str) -> Self {
        Self { name, ..self }
    }

    /// Records one occurrence of the given outcome.
    ///
    /// Lock-free; the current thread updates only its own slot.
    #[inline]
    pub fn record(&self, outcome: Outcome) {
        self.add(outcome, 1);
    }

    /// Adds `value` occurrences of the given outcome.
    #[inline]
    pub fn add(&self, outcome: Outcome, value: u64) {
        self.local_slot().counts[outcome.index()].fetch_add(value, Ordering::Relaxed);
    }

    /// Returns the total for a single outcome, summed across all slots.
    #[inline]
    pub fn total(&self, outcome: Outcome) -> u64 {
        self.slots
            .iter()
            .map(|slot| slot.counts[outcome.index()].load(Ordering::Relaxed))
            .sum()
    }

    /// Takes a point-in-time copy of all five counts.
    ///
    /// Sums every slot per outcome. The accumulator keeps counting while the
    /// snapshot is aggregated elsewhere.
    pub fn snapshot(&self) -> ConsumerStatistics {
        let mut stats = ConsumerStatistics::new();
        for outcome in Outcome::ALL {
            stats.set(outcome, self.total(outcome));
        }
        stats
    }

    /// Takes a copy of all five counts and resets them to zero.
    ///
    /// Each slot is swapped to zero atomically, but the aggregate across
    /// slots is not atomic: outcomes recorded concurrently may land in either
    /// the returned snapshot or the next collection period.
    pub fn snapshot_and_reset(&self) -> ConsumerStatistics {
        let mut stats = ConsumerStatistics::new();
        for slot in self.slots.iter() {
            for outcome in Outcome::ALL {
                stats.add(
                    outcome,
                    slot.counts[outcome.index()].swap(0, Ordering::Relaxed),
                );
            }
        }
        stats
    }

    /// Returns a scalar view of a single outcome column.
    ///
    /// The view implements [`Observable`] and yields [`StatValue::Count`],
    /// which is what scalar exports want. Scalar views cannot be folded into
    /// a full statistics aggregate; see
    /// [`ConsumerStatistics::checked_add`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statistiche::stats::{LiveStatistics, Observable, Outcome, StatValue};
    ///
    /// let stats = LiveStatistics::new().with_name("mailman");
    /// stats.add(Outcome::Failed, 3);
    ///
    /// let failed = stats.outcome(Outcome::Failed);
    /// assert_eq!(failed.value(), StatValue::Count(3));
    /// assert_eq!(failed.name(), "mailman.failed");
    /// ```
    pub fn outcome(&self, outcome: Outcome) -> OutcomeView<'_> {
        let name = if self.name.is_empty() {
            outcome.as_str().to_string()
        } else {
            format!("{}.{}", self.name, outcome)
        };
        OutcomeView {
            live: self,
            outcome,
            name,
        }
    }

    /// Returns a reference to the current thread's slot.
    #[inline]
    fn local_slot(&self) -> &Slot {
        THREAD_SLOT_INDEX.with(|idx| &self.slots[*idx])
    }
}

impl Observable for LiveStatistics {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    #[inline]
    fn value(&self) -> StatValue {
        StatValue::Statistics(self.snapshot())
    }

    #[inline]
    fn value_and_reset(&self) -> StatValue {
        StatValue::Statistics(self.snapshot_and_reset())
    }
}

impl Default for LiveStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for LiveStatistics {
    /// Formats the accumulator showing non-zero slots.
    ///
    /// Output format: `name{ [slot]:recv/proc/drop/rej/fail ... }`, one
    /// entry per slot that recorded anything.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.name)?;
        for (i, slot) in self.slots.iter().enumerate() {
            let counts: Vec<u64> = slot
                .counts
                .iter()
                .map(|c| c.load(Ordering::Relaxed))
                .collect();
            if counts.iter().any(|&v| v != 0) {
                write!(
                    f,
                    " [{i}]:{}/{}/{}/{}/{}",
                    counts[0], counts[1], counts[2], counts[3], counts[4]
                )?;
            }
        }
        write!(f, " }}")
    }
}

/// A borrowed, observable view of one outcome column of a [`LiveStatistics`].
///
/// Created by [`LiveStatistics::outcome`]. Its observed value is a
/// [`StatValue::Count`]; resetting through the view resets only its column.
pub struct OutcomeView<'a> {
    live: &'a LiveStatistics,
    outcome: Outcome,
    name: String,
}

impl OutcomeView<'_> {
    /// The outcome this view exposes.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

impl Observable for OutcomeView<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> StatValue {
        StatValue::Count(self.live.total(self.outcome))
    }

    fn value_and_reset(&self) -> StatValue {
        let mut total = 0u64;
        for slot in self.live.slots.iter() {
            total += slot.counts[self.outcome.index()].swap(0, Ordering::Relaxed);
        }
        StatValue::Count(total)
    }
}

impl Debug for OutcomeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.live.total(self.outcome))
    }
}
