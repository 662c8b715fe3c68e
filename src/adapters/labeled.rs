//! Labeled wrapper for attaching broker-topology labels to a source.
//!
//! This module provides [`Labeled`], a wrapper that adds key-value labels to
//! a statistics source. Labels describe where the consumer sits in the
//! broker topology (queue, exchange, routing key) and are picked up by the
//! exporting observers: the Prometheus observer emits them as metric labels,
//! the JSON observer includes them in each snapshot.
//!
//! # Example
//!
//! ```rust
//! use statistiche::stats::{LiveStatistics, Observable, Outcome};
//! use statistiche::adapters::Labeled;
//!
//! let consumer = Labeled::new(LiveStatistics::new().with_name("mailman"))
//!     .with_label("queue", "updates")
//!     .with_label("routing_key", "org.example.#");
//!
//! consumer.record(Outcome::Received);
//!
//! assert_eq!(consumer.get_label("queue"), Some("updates"));
//! assert_eq!(consumer.labels().len(), 2);
//! ```

use crate::stats::{Observable, StatValue};
use std::fmt::{self, Debug};
use std::ops::Deref;

/// A wrapper that adds labels (key-value tags) to a statistics source.
///
/// Labels are useful for:
///
/// - **Prometheus export**: labels become metric dimensions
/// - **Fleet filtering**: distinguish consumers of the same kind bound to
///   different queues
/// - **Operational context**: carry the binding (exchange, routing key) next
///   to the counts it explains
///
/// # Example
///
/// ```rust
/// use statistiche::stats::LiveStatistics;
/// use statistiche::adapters::Labeled;
///
/// let consumer = Labeled::new(LiveStatistics::new().with_name("mailman"))
///     .with_label("queue", "updates")
///     .with_label("exchange", "amq.topic");
///
/// assert_eq!(consumer.get_label("exchange"), Some("amq.topic"));
/// ```
pub struct Labeled<T> {
    inner: T,
    labels: Vec<(String, String)>,
}

impl<T> Labeled<T> {
    /// Creates a new labeled wrapper around the given source.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            labels: Vec::new(),
        }
    }

    /// Creates a new labeled wrapper with pre-defined labels.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statistiche::stats::LiveStatistics;
    /// use statistiche::adapters::Labeled;
    ///
    /// let labels = vec![
    ///     ("queue".to_string(), "updates".to_string()),
    ///     ("exchange".to_string(), "amq.topic".to_string()),
    /// ];
    ///
    /// let consumer = Labeled::with_labels(LiveStatistics::new(), labels);
    /// ```
    pub fn with_labels(inner: T, labels: Vec<(String, String)>) -> Self {
        Self { inner, labels }
    }

    /// Adds a label, returning `self` for chaining.
    ///
    /// If the key already exists, its value is updated.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_label(key, value);
        self
    }

    /// Adds a label to an existing wrapper (non-builder form).
    ///
    /// If the key already exists, its value is updated.
    pub fn add_label(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        if let Some(pos) = self.labels.iter().position(|(k, _)| k == &key) {
            self.labels[pos].1 = value;
        } else {
            self.labels.push((key, value));
        }
    }

    /// Looks up a label value by key.
    pub fn get_label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all labels in insertion order.
    pub fn labels(&self) -> &[(String, String)] {
        &self.labels
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

impl<T: Observable> Observable for Labeled<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn value(&self) -> StatValue {
        self.inner.value()
    }

    fn value_and_reset(&self) -> StatValue {
        self.inner.value_and_reset()
    }

    fn labels(&self) -> &[(String, String)] {
        &self.labels
    }
}

impl<T> Deref for Labeled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Debug> Debug for Labeled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.inner)?;
        for (key, value) in &self.labels {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}
