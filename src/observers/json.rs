//! JSON observer for serializing consumer statistics.
//!
//! This module provides [`JsonObserver`], which serializes a collection of
//! [`Observable`] statistics sources to JSON using serde.
//!
//! # Feature Flag
//!
//! This module requires the `json` feature:
//!
//! ```toml
//! [dependencies]
//! statistiche = { version = "0.3", features = ["json"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use statistiche::stats::{LiveStatistics, Observable, Outcome};
//! use statistiche::observers::json::JsonObserver;
//!
//! let mailman = LiveStatistics::new().with_name("mailman");
//! mailman.record(Outcome::Received);
//! mailman.record(Outcome::Processed);
//!
//! let sources: Vec<&dyn Observable> = vec![&mailman];
//!
//! let observer = JsonObserver::new();
//! let json = observer.to_json(sources.into_iter()).unwrap();
//!
//! println!("{}", json);
//! // [{"name":"mailman","value":{"received":1,"processed":1,"dropped":0,"rejected":0,"failed":0}}]
//! ```

use crate::stats::{ConsumerStatistics, Observable, StatValue};
use serde::{Deserialize, Serialize};

/// A serialized view of one statistics source.
///
/// Full consumers serialize their five counts as an object; scalar outcome
/// views serialize as a bare number. Labels attached via
/// [`Labeled`](crate::adapters::Labeled) are included when present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceSnapshot {
    /// The source name.
    pub name: String,
    /// Broker-topology labels, omitted when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<(String, String)>,
    /// The observed value.
    pub value: SnapshotValue,
}

/// The serialized value of a source, either a full statistics object or a
/// bare count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SnapshotValue {
    /// A full five-field statistics snapshot.
    Statistics(ConsumerStatistics),
    /// A single outcome total.
    Count(u64),
}

impl From<StatValue> for SnapshotValue {
    fn from(value: StatValue) -> Self {
        match value {
            StatValue::Statistics(stats) => SnapshotValue::Statistics(stats),
            StatValue::Count(v) => SnapshotValue::Count(v),
        }
    }
}

impl SnapshotValue {
    /// Returns the full statistics, if this value holds them.
    pub fn as_statistics(&self) -> Option<&ConsumerStatistics> {
        match self {
            SnapshotValue::Statistics(stats) => Some(stats),
            SnapshotValue::Count(_) => None,
        }
    }

    /// Returns the scalar count, if this value holds one.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            SnapshotValue::Statistics(_) => None,
            SnapshotValue::Count(v) => Some(*v),
        }
    }
}

/// A collection of source snapshots, typically representing a point-in-time
/// capture of a consumer fleet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FleetExport {
    /// Optional timestamp in milliseconds since Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    /// The source snapshots.
    pub sources: Vec<SourceSnapshot>,
}

impl FleetExport {
    /// Creates a new export with the given snapshots.
    pub fn new(sources: Vec<SourceSnapshot>) -> Self {
        Self {
            timestamp_ms: None,
            sources,
        }
    }

    /// Creates a new export with snapshots and a timestamp.
    pub fn with_timestamp(sources: Vec<SourceSnapshot>, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            sources,
        }
    }

    /// Finds a source snapshot by name.
    pub fn get(&self, name: &str) -> Option<&SourceSnapshot> {
        self.sources.iter().find(|s| s.name == name)
    }
}

/// Configuration for the JSON observer.
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Whether to pretty-print the JSON output.
    pub pretty: bool,
    /// Whether to include a timestamp in the output.
    pub include_timestamp: bool,
    /// Whether to wrap the snapshots in a [`FleetExport`] object.
    pub wrap_in_snapshot: bool,
}

/// An observer that serializes statistics sources to JSON.
///
/// # Examples
///
/// Basic usage (array of sources):
///
/// ```rust,ignore
/// use statistiche::stats::{LiveStatistics, Observable, Outcome};
/// use statistiche::observers::json::JsonObserver;
///
/// let mailman = LiveStatistics::new().with_name("mailman");
/// mailman.record(Outcome::Received);
///
/// let sources: Vec<&dyn Observable> = vec![&mailman];
/// let json = JsonObserver::new().to_json(sources.into_iter()).unwrap();
///
/// assert!(json.contains("mailman"));
/// ```
///
/// With timestamp wrapper:
///
/// ```rust,ignore
/// use statistiche::observers::json::JsonObserver;
///
/// let observer = JsonObserver::new()
///     .wrap_in_snapshot(true)
///     .include_timestamp(true);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonObserver {
    config: JsonConfig,
}

impl JsonObserver {
    /// Creates a new JSON observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new JSON observer with the specified configuration.
    pub fn with_config(config: JsonConfig) -> Self {
        Self { config }
    }

    /// Enables or disables pretty-printing.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.config.pretty = enabled;
        self
    }

    /// Enables or disables timestamp inclusion.
    ///
    /// Only has effect when `wrap_in_snapshot` is also enabled.
    pub fn include_timestamp(mut self, enabled: bool) -> Self {
        self.config.include_timestamp = enabled;
        self
    }

    /// Enables or disables wrapping the output in a [`FleetExport`].
    pub fn wrap_in_snapshot(mut self, enabled: bool) -> Self {
        self.config.wrap_in_snapshot = enabled;
        self
    }

    /// Collects sources into a vector of [`SourceSnapshot`].
    ///
    /// This is useful when you need the intermediate representation
    /// before serialization.
    pub fn collect<'a>(
        &self,
        sources: impl Iterator<Item = &'a dyn Observable>,
    ) -> Vec<SourceSnapshot> {
        sources
            .map(|s| SourceSnapshot {
                name: display_name(s),
                labels: s.labels().to_vec(),
                value: s.value().into(),
            })
            .collect()
    }

    /// Collects sources and drains them.
    pub fn collect_and_reset<'a>(
        &self,
        sources: impl Iterator<Item = &'a dyn Observable>,
    ) -> Vec<SourceSnapshot> {
        sources
            .map(|s| SourceSnapshot {
                name: display_name(s),
                labels: s.labels().to_vec(),
                value: s.value_and_reset().into(),
            })
            .collect()
    }

    /// Serializes sources to a JSON string.
    pub fn to_json<'a>(
        &self,
        sources: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<String, serde_json::Error> {
        self.render(self.collect(sources))
    }

    /// Serializes sources to JSON, draining them.
    pub fn to_json_and_reset<'a>(
        &self,
        sources: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<String, serde_json::Error> {
        self.render(self.collect_and_reset(sources))
    }

    /// Serializes sources to a JSON byte vector.
    pub fn to_json_bytes<'a>(
        &self,
        sources: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<Vec<u8>, serde_json::Error> {
        self.render(self.collect(sources)).map(String::into_bytes)
    }

    fn render(&self, snapshots: Vec<SourceSnapshot>) -> Result<String, serde_json::Error> {
        if self.config.wrap_in_snapshot {
            let export = if self.config.include_timestamp {
                FleetExport::with_timestamp(snapshots, current_timestamp_ms())
            } else {
                FleetExport::new(snapshots)
            };
            if self.config.pretty {
                serde_json::to_string_pretty(&export)
            } else {
                serde_json::to_string(&export)
            }
        } else if self.config.pretty {
            serde_json::to_string_pretty(&snapshots)
        } else {
            serde_json::to_string(&snapshots)
        }
    }
}

fn display_name(source: &dyn Observable) -> String {
    if source.name().is_empty() {
        "(unnamed)".to_string()
    } else {
        source.name().to_string()
    }
}

/// Returns the current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Labeled;
    use crate::stats::{LiveStatistics, Outcome};

    #[test]
    fn test_to_json_empty() {
        let observer = JsonObserver::new();
        let sources: Vec<&dyn Observable> = vec![];
        assert_eq!(observer.to_json(sources.into_iter()).unwrap(), "[]");
    }

    #[test]
    fn test_to_json_single_consumer() {
        let mailman = LiveStatistics::new().with_name("mailman");
        mailman.add(Outcome::Received, 43);
        mailman.add(Outcome::Processed, 45);
        mailman.add(Outcome::Dropped, 10);

        let sources: Vec<&dyn Observable> = vec![&mailman];
        let json = JsonObserver::new().to_json(sources.into_iter()).unwrap();

        assert_eq!(
            json,
            r#"[{"name":"mailman","value":{"received":43,"processed":45,"dropped":10,"rejected":0,"failed":0}}]"#
        );
    }

    #[test]
    fn test_to_json_scalar_view() {
        let mailman = LiveStatistics::new().with_name("mailman");
        mailman.add(Outcome::Failed, 3);
        let failed = mailman.outcome(Outcome::Failed);

        let sources: Vec<&dyn Observable> = vec![&failed];
        let json = JsonObserver::new().to_json(sources.into_iter()).unwrap();

        assert_eq!(json, r#"[{"name":"mailman.failed","value":3}]"#);
    }

    #[test]
    fn test_to_json_includes_labels() {
        let mailman = Labeled::new(LiveStatistics::new().with_name("mailman"))
            .with_label("queue", "updates");

        let sources: Vec<&dyn Observable> = vec![&mailman];
        let json = JsonObserver::new().to_json(sources.into_iter()).unwrap();

        assert!(json.contains(r#""labels":[["queue","updates"]]"#));
    }

    #[test]
    fn test_to_json_unnamed() {
        let stats = LiveStatistics::new();
        let sources: Vec<&dyn Observable> = vec![&stats];
        let json = JsonObserver::new().to_json(sources.into_iter()).unwrap();
        assert!(json.contains("(unnamed)"));
    }

    #[test]
    fn test_wrap_in_snapshot() {
        let mailman = LiveStatistics::new().with_name("mailman");
        let sources: Vec<&dyn Observable> = vec![&mailman];

        let json = JsonObserver::new()
            .wrap_in_snapshot(true)
            .to_json(sources.into_iter())
            .unwrap();

        assert!(json.starts_with(r#"{"sources":"#));
    }

    #[test]
    fn test_wrap_with_timestamp() {
        let mailman = LiveStatistics::new().with_name("mailman");
        let sources: Vec<&dyn Observable> = vec![&mailman];

        let json = JsonObserver::new()
            .wrap_in_snapshot(true)
            .include_timestamp(true)
            .to_json(sources.into_iter())
            .unwrap();

        assert!(json.contains("timestamp_ms"));
    }

    #[test]
    fn test_pretty() {
        let mailman = LiveStatistics::new().with_name("mailman");
        let sources: Vec<&dyn Observable> = vec![&mailman];

        let json = JsonObserver::new()
            .pretty(true)
            .to_json(sources.into_iter())
            .unwrap();

        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_and_reset() {
        let mailman = LiveStatistics::new().with_name("mailman");
        mailman.record(Outcome::Received);

        let sources: Vec<&dyn Observable> = vec![&mailman];
        let json = JsonObserver::new()
            .to_json_and_reset(sources.into_iter())
            .unwrap();

        assert!(json.contains(r#""received":1"#));
        assert!(mailman.snapshot().is_zero());
    }

    #[test]
    fn test_snapshot_value_round_trip() {
        let snapshot = SourceSnapshot {
            name: "mailman".to_string(),
            labels: vec![],
            value: SnapshotValue::Count(7),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: SourceSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value.as_count(), Some(7));
    }

    #[test]
    fn test_collect() {
        let a = LiveStatistics::new().with_name("a");
        let b = LiveStatistics::new().with_name("b");
        a.record(Outcome::Received);

        let sources: Vec<&dyn Observable> = vec![&a, &b];
        let snapshots = JsonObserver::new().collect(sources.into_iter());

        assert_eq!(snapshots.len(), 2);
        assert_eq!(
            snapshots[0].value.as_statistics().unwrap().received,
            1
        );
    }

    #[test]
    fn test_fleet_export_get() {
        let export = FleetExport::new(vec![SourceSnapshot {
            name: "mailman".to_string(),
            labels: vec![],
            value: SnapshotValue::Count(1),
        }]);
        assert!(export.get("mailman").is_some());
        assert!(export.get("archiver").is_none());
    }
}
