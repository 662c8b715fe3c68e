//! Fleet registry for collecting and aggregating consumer statistics.
//!
//! This module provides [`ConsumerRegistry`], the coordinating side of the
//! statistics model: consumers own and update their sources, the registry
//! periodically reads snapshots from every registered source and folds them
//! into one fleet-wide [`ConsumerStatistics`].
//!
//! The registry never blocks a consumer: reading a source takes a copy, and
//! folding copies allocates fresh values only.
//!
//! # Example
//!
//! ```rust
//! use statistiche::registry::ConsumerRegistry;
//! use statistiche::stats::Outcome;
//!
//! let registry = ConsumerRegistry::new();
//!
//! let mailman = registry.register_consumer("mailman");
//! let archiver = registry.register_consumer("archiver");
//!
//! mailman.record(Outcome::Received);
//! mailman.record(Outcome::Processed);
//! archiver.record(Outcome::Received);
//! archiver.record(Outcome::Dropped);
//!
//! let fleet = registry.aggregate().unwrap();
//! assert_eq!(fleet.received, 2);
//! assert_eq!(fleet.processed, 1);
//! assert_eq!(fleet.dropped, 1);
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use crate::stats::{ConsumerStatistics, LiveStatistics, Observable, StatValue, StatsError};

/// A shareable statistics source.
pub type SharedSource = Arc<dyn Observable + Send + Sync>;

/// A registry of statistics sources, aggregated fleet-wide on demand.
///
/// The registry holds shared handles to any number of [`Observable`] sources
/// and offers two read paths:
///
/// - [`aggregate`](ConsumerRegistry::aggregate) - one fleet-wide sum,
///   produced by folding every source's snapshot with the checked addition.
/// - [`collect`](ConsumerRegistry::collect) - one row per consumer, the
///   shape the observers render.
///
/// Registration and reading may happen from any thread.
#[derive(Default)]
pub struct ConsumerRegistry {
    sources: RwLock<Vec<SharedSource>>,
}

impl ConsumerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an existing statistics source.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use statistiche::registry::ConsumerRegistry;
    /// use statistiche::stats::LiveStatistics;
    ///
    /// let registry = ConsumerRegistry::new();
    /// registry.register(Arc::new(LiveStatistics::new().with_name("archiver")));
    /// ```
    pub fn register(&self, source: SharedSource) {
        self.write().push(source);
    }

    /// Creates, registers, and returns a live counter for a new consumer.
    ///
    /// The returned handle is what the consumer's execution path records
    /// outcomes on; the registry keeps its own handle for collection.
    pub fn register_consumer(&self, name: &'static str) -> Arc<LiveStatistics> {
        let stats = Arc::new(LiveStatistics::new().with_name(name));
        self.register(stats.clone());
        stats
    }

    /// Folds every registered source's snapshot into one fleet-wide sum.
    ///
    /// Fails with [`StatsError::InvalidOperand`] if a registered source
    /// yields a scalar count (see
    /// [`LiveStatistics::outcome`](crate::stats::LiveStatistics::outcome)):
    /// a bare count cannot be added to a statistics aggregate.
    pub fn aggregate(&self) -> Result<ConsumerStatistics, StatsError> {
        let sources = self.read();
        let mut total = ConsumerStatistics::new();
        for source in sources.iter() {
            total = total.checked_add(&source.value())?;
        }
        Ok(total)
    }

    /// Like [`aggregate`](ConsumerRegistry::aggregate), draining every
    /// source.
    pub fn aggregate_and_reset(&self) -> Result<ConsumerStatistics, StatsError> {
        let sources = self.read();
        let mut total = ConsumerStatistics::new();
        for source in sources.iter() {
            total = total.checked_add(&source.value_and_reset())?;
        }
        Ok(total)
    }

    /// Returns one `(name, snapshot)` row per registered statistics source.
    ///
    /// Sources yielding scalar counts are skipped; they carry no field
    /// structure to put in a row. Unnamed sources appear as `(unnamed)`.
    pub fn collect(&self) -> Vec<(String, ConsumerStatistics)> {
        self.read()
            .iter()
            .filter_map(|source| match source.value() {
                StatValue::Statistics(stats) => Some((display_name(source.name()), stats)),
                StatValue::Count(_) => None,
            })
            .collect()
    }

    /// Returns the number of registered sources.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no source is registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Runs `f` over a borrowed view of every registered source.
    ///
    /// This is how the observers consume a registry without cloning handles:
    ///
    /// ```rust,ignore
    /// registry.with_sources(|sources| observer.render(sources.iter().map(|s| s.as_ref())))
    /// ```
    pub fn with_sources<R>(&self, f: impl FnOnce(&[SharedSource]) -> R) -> R {
        f(&self.read())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<SharedSource>> {
        self.sources.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<SharedSource>> {
        self.sources.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn display_name(name: &str) -> String {
    if name.is_empty() {
        "(unnamed)".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Windowed;
    use crate::stats::Outcome;

    #[test]
    fn test_empty_aggregate() {
        let registry = ConsumerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.aggregate().unwrap().is_zero());
    }

    #[test]
    fn test_aggregate_sums_consumers() {
        let registry = ConsumerRegistry::new();
        let a = registry.register_consumer("a");
        let b = registry.register_consumer("b");

        a.add(Outcome::Received, 42);
        a.add(Outcome::Processed, 43);
        b.add(Outcome::Received, 1);
        b.add(Outcome::Processed, 2);
        b.add(Outcome::Dropped, 10);

        let fleet = registry.aggregate().unwrap();
        assert_eq!(fleet.received, 43);
        assert_eq!(fleet.processed, 45);
        assert_eq!(fleet.dropped, 10);
        assert_eq!(fleet.rejected, 0);
        assert_eq!(fleet.failed, 0);
    }

    #[test]
    fn test_aggregate_equals_sum_of_snapshots() {
        let registry = ConsumerRegistry::new();
        let consumers: Vec<_> = (0..3)
            .map(|_| registry.register_consumer("worker"))
            .collect();
        for (i, consumer) in consumers.iter().enumerate() {
            consumer.add(Outcome::Received, i as u64 + 1);
        }

        let by_hand: ConsumerStatistics = consumers.iter().map(|c| c.snapshot()).sum();
        assert_eq!(registry.aggregate().unwrap(), by_hand);
    }

    #[test]
    fn test_aggregate_rejects_scalar_sources() {
        struct ScalarSource;

        impl std::fmt::Debug for ScalarSource {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "scalar")
            }
        }

        impl Observable for ScalarSource {
            fn name(&self) -> &str {
                "scalar"
            }
            fn value(&self) -> StatValue {
                StatValue::Count(42)
            }
            fn value_and_reset(&self) -> StatValue {
                StatValue::Count(42)
            }
        }

        let registry = ConsumerRegistry::new();
        registry.register_consumer("ok");
        registry.register(Arc::new(ScalarSource));

        assert_eq!(
            registry.aggregate().unwrap_err(),
            StatsError::InvalidOperand
        );
    }

    #[test]
    fn test_aggregate_and_reset_drains() {
        let registry = ConsumerRegistry::new();
        let a = registry.register_consumer("a");
        a.add(Outcome::Received, 5);

        assert_eq!(registry.aggregate_and_reset().unwrap().received, 5);
        assert!(registry.aggregate().unwrap().is_zero());
    }

    #[test]
    fn test_collect_rows() {
        let registry = ConsumerRegistry::new();
        let a = registry.register_consumer("mailman");
        a.record(Outcome::Received);
        registry.register(Arc::new(LiveStatistics::new()));

        let rows = registry.collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "mailman");
        assert_eq!(rows[0].1.received, 1);
        assert_eq!(rows[1].0, "(unnamed)");
    }

    #[test]
    fn test_windowed_source_in_registry() {
        let registry = ConsumerRegistry::new();
        let windowed = Arc::new(Windowed::new(LiveStatistics::new().with_name("w")));
        registry.register(windowed.clone());

        windowed.add(Outcome::Received, 10);
        assert_eq!(registry.aggregate().unwrap().received, 10);
        // the windowed source was drained by the read
        assert!(registry.aggregate().unwrap().is_zero());
    }

    #[test]
    fn test_registration_from_threads() {
        use std::thread;

        let registry = Arc::new(ConsumerRegistry::new());
        let mut handles = vec![];
        for _ in 0..4 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                let stats = registry.register_consumer("worker");
                stats.record(Outcome::Received);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.aggregate().unwrap().received, 4);
    }
}
