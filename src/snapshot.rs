//! Snapshot types for serializing consumer statistics.
//!
//! This module provides serializable point-in-time captures of one or many
//! consumers' statistics, for shipping across process boundaries (management
//! APIs, log pipelines, IPC) and re-aggregating on the other side.
//!
//! # Feature Flag
//!
//! This module requires the `serde` feature:
//!
//! ```toml
//! [dependencies]
//! statistiche = { version = "0.3", features = ["serde"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use statistiche::snapshot::{ConsumerSnapshot, FleetSnapshot};
//! use statistiche::stats::{LiveStatistics, Outcome};
//!
//! let mailman = LiveStatistics::new().with_name("mailman");
//! mailman.record(Outcome::Received);
//!
//! let snapshot = ConsumerSnapshot::from_observable(&mailman).unwrap();
//! let json = serde_json::to_string(&snapshot)?;
//! // {"name":"mailman","stats":{"received":1,"processed":0,...}}
//! ```

use serde::{Deserialize, Serialize};

use crate::stats::{ConsumerStatistics, Observable, StatValue};

/// A serializable capture of one consumer's statistics.
///
/// # Examples
///
/// ```rust,ignore
/// use statistiche::snapshot::ConsumerSnapshot;
/// use statistiche::stats::ConsumerStatistics;
///
/// let snapshot = ConsumerSnapshot::new("mailman", ConsumerStatistics::new());
/// let json = serde_json::to_string(&snapshot).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsumerSnapshot {
    /// The consumer name.
    pub name: String,
    /// The captured counts.
    pub stats: ConsumerStatistics,
}

impl ConsumerSnapshot {
    /// Creates a new snapshot from a name and captured counts.
    pub fn new(name: impl Into<String>, stats: ConsumerStatistics) -> Self {
        Self {
            name: name.into(),
            stats,
        }
    }

    /// Captures a snapshot from an observable source.
    ///
    /// Returns `None` for sources yielding a scalar count; a bare count has
    /// no field structure to capture. Unnamed sources are captured as
    /// `(unnamed)`.
    pub fn from_observable(source: &dyn Observable) -> Option<Self> {
        match source.value() {
            StatValue::Statistics(stats) => Some(Self::new(snapshot_name(source), stats)),
            StatValue::Count(_) => None,
        }
    }

    /// Captures a snapshot from an observable source, draining it.
    pub fn from_observable_and_reset(source: &dyn Observable) -> Option<Self> {
        match source.value_and_reset() {
            StatValue::Statistics(stats) => Some(Self::new(snapshot_name(source), stats)),
            StatValue::Count(_) => None,
        }
    }
}

fn snapshot_name(source: &dyn Observable) -> String {
    if source.name().is_empty() {
        "(unnamed)".to_string()
    } else {
        source.name().to_string()
    }
}

/// A point-in-time capture of a whole consumer fleet.
///
/// # Examples
///
/// ```rust,ignore
/// use statistiche::snapshot::{ConsumerSnapshot, FleetSnapshot};
/// use statistiche::stats::ConsumerStatistics;
///
/// let snapshot = FleetSnapshot::new(vec![
///     ConsumerSnapshot::new("mailman", ConsumerStatistics::new()),
///     ConsumerSnapshot::new("archiver", ConsumerStatistics::new()),
/// ]);
///
/// assert!(snapshot.total().is_zero());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FleetSnapshot {
    /// Optional timestamp in milliseconds since Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    /// The per-consumer snapshots.
    pub consumers: Vec<ConsumerSnapshot>,
}

impl FleetSnapshot {
    /// Creates a new fleet snapshot with the given consumer captures.
    pub fn new(consumers: Vec<ConsumerSnapshot>) -> Self {
        Self {
            timestamp_ms: None,
            consumers,
        }
    }

    /// Creates a new fleet snapshot with a timestamp.
    pub fn with_timestamp(consumers: Vec<ConsumerSnapshot>, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            consumers,
        }
    }

    /// Finds a consumer's capture by name.
    pub fn get(&self, name: &str) -> Option<&ConsumerSnapshot> {
        self.consumers.iter().find(|c| c.name == name)
    }

    /// Captures snapshots from an iterator of observable sources.
    ///
    /// Scalar sources are skipped.
    pub fn collect<'a>(sources: impl Iterator<Item = &'a dyn Observable>) -> Self {
        Self::new(
            sources
                .filter_map(ConsumerSnapshot::from_observable)
                .collect(),
        )
    }

    /// Captures snapshots from an iterator of observable sources, draining
    /// them.
    pub fn collect_and_reset<'a>(sources: impl Iterator<Item = &'a dyn Observable>) -> Self {
        Self::new(
            sources
                .filter_map(ConsumerSnapshot::from_observable_and_reset)
                .collect(),
        )
    }

    /// Sums every captured consumer's counts into one fleet-wide value.
    pub fn total(&self) -> ConsumerStatistics {
        self.consumers.iter().map(|c| c.stats).sum()
    }

    /// Merges two fleet snapshots into a new one.
    ///
    /// Consumers present in both snapshots have their counts summed;
    /// consumers present in only one are carried over. The result keeps
    /// `self`'s timestamp if set, otherwise `other`'s. Useful for combining
    /// captures from several collection points (e.g. one per process) into
    /// one fleet view.
    pub fn merge(&self, other: &FleetSnapshot) -> FleetSnapshot {
        let mut consumers: Vec<ConsumerSnapshot> = self.consumers.clone();
        for theirs in &other.consumers {
            match consumers.iter_mut().find(|c| c.name == theirs.name) {
                Some(ours) => ours.stats += theirs.stats,
                None => consumers.push(theirs.clone()),
            }
        }
        FleetSnapshot {
            timestamp_ms: self.timestamp_ms.or(other.timestamp_ms),
            consumers,
        }
    }
}
