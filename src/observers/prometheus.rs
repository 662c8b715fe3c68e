//! Prometheus observer for exporting statistics using the official `prometheus` crate.
//!
//! This module provides [`PrometheusObserver`], which exports a collection of
//! [`Observable`] statistics sources to a Prometheus
//! [`Registry`](prometheus::Registry) and renders them with the official text
//! encoder.
//!
//! # Feature Flag
//!
//! This module requires the `prometheus` feature:
//!
//! ```toml
//! [dependencies]
//! statistiche = { version = "0.3", features = ["prometheus"] }
//! ```
//!
//! # Metric Layout
//!
//! Each outcome becomes one counter family, with the consumer name (and any
//! adapter labels) as dimensions:
//!
//! ```text
//! messages_received_total{consumer="mailman",queue="updates"} 1000
//! messages_received_total{consumer="archiver",queue="archive"} 120
//! messages_failed_total{consumer="mailman",queue="updates"} 2
//! ```
//!
//! Scalar outcome views export as standalone counters named after the view.
//!
//! Rendering is local: serve the returned string on an HTTP `/metrics`
//! endpoint yourself if you want Prometheus to scrape it.
//!
//! # Examples
//!
//! ```rust,ignore
//! use statistiche::stats::{LiveStatistics, Observable, Outcome};
//! use statistiche::observers::prometheus::PrometheusObserver;
//!
//! let mailman = LiveStatistics::new().with_name("mailman");
//! mailman.add(Outcome::Received, 100);
//!
//! let observer = PrometheusObserver::new().with_namespace("amqp");
//! let sources: Vec<&dyn Observable> = vec![&mailman];
//!
//! let output = observer.render(sources.into_iter())?;
//! println!("{}", output);
//! # Ok::<(), statistiche::observers::ObserverError>(())
//! ```

use crate::stats::{ConsumerStatistics, Observable, Outcome, StatValue};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;

use super::error::{PrometheusError, Result};

/// Observer that exports consumer statistics in Prometheus exposition format.
///
/// One counter family per outcome; the consumer name and any adapter labels
/// become metric dimensions. A fresh registry is built per render so repeated
/// exports never conflict.
///
/// # Example
///
/// ```rust,ignore
/// use statistiche::observers::prometheus::PrometheusObserver;
///
/// let observer = PrometheusObserver::new()
///     .with_namespace("amqp")
///     .with_const_label("instance", "server-1");
/// ```
pub struct PrometheusObserver {
    /// Namespace (prefix) for all metrics.
    namespace: Option<String>,
    /// Constant labels applied to all metrics.
    const_labels: HashMap<String, String>,
}

impl Default for PrometheusObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PrometheusObserver {
    /// Creates a new `PrometheusObserver`.
    pub fn new() -> Self {
        Self {
            namespace: None,
            const_labels: HashMap::new(),
        }
    }

    /// Sets the namespace (prefix) for all metrics.
    ///
    /// The namespace is prepended to metric names with an underscore.
    /// For example, namespace "amqp" + metric "messages_received_total" =
    /// "amqp_messages_received_total".
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Adds a constant label to all metrics.
    ///
    /// Constant labels identify the exporting instance, environment, or
    /// other metadata shared by every metric.
    pub fn with_const_label(mut self, name: &str, value: &str) -> Self {
        self.const_labels
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Renders sources to Prometheus exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if metric creation, registration, or encoding fails
    /// (e.g. two scalar views exporting under the same sanitized name).
    pub fn render<'a>(&self, sources: impl Iterator<Item = &'a dyn Observable>) -> Result<String> {
        let samples: Vec<Sample> = sources.map(|s| Sample::read(s, false)).collect();
        self.render_samples(samples)
    }

    /// Renders sources and drains them.
    pub fn render_and_reset<'a>(
        &self,
        sources: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<String> {
        let samples: Vec<Sample> = sources.map(|s| Sample::read(s, true)).collect();
        self.render_samples(samples)
    }

    /// Renders sources to bytes (useful for HTTP responses).
    pub fn render_bytes<'a>(
        &self,
        sources: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<Vec<u8>> {
        Ok(self.render(sources)?.into_bytes())
    }

    fn render_samples(&self, samples: Vec<Sample>) -> Result<String> {
        let registry = Registry::new();

        let mut stats_samples = Vec::new();
        for sample in samples {
            match sample.value {
                StatValue::Statistics(stats) => stats_samples.push((sample.name, sample.labels, stats)),
                StatValue::Count(count) => {
                    self.register_scalar(&registry, &sample.name, &sample.labels, count)?;
                }
            }
        }

        if !stats_samples.is_empty() {
            self.register_outcome_families(&registry, &stats_samples)?;
        }

        self.encode_registry(&registry)
    }

    /// Registers one counter family per outcome, with consumer name and
    /// adapter labels as dimensions.
    fn register_outcome_families(
        &self,
        registry: &Registry,
        samples: &[(String, Vec<(String, String)>, ConsumerStatistics)],
    ) -> Result<()> {
        // Prometheus requires one fixed label set per family, so the family
        // carries the union of every sample's label keys.
        let mut extra_keys: Vec<&str> = samples
            .iter()
            .flat_map(|(_, labels, _)| labels.iter().map(|(k, _)| k.as_str()))
            .collect();
        extra_keys.sort_unstable();
        extra_keys.dedup();

        let mut label_names = vec!["consumer"];
        label_names.extend(extra_keys.iter().copied());

        for outcome in Outcome::ALL {
            let opts = self.build_opts(
                &format!("messages_{}_total", outcome),
                outcome_help(outcome),
            );
            let family = IntCounterVec::new(opts, &label_names)?;

            for (consumer, labels, stats) in samples {
                let mut values = vec![consumer.as_str()];
                for key in &extra_keys {
                    values.push(
                        labels
                            .iter()
                            .find(|(k, _)| k == key)
                            .map(|(_, v)| v.as_str())
                            .unwrap_or(""),
                    );
                }
                family.with_label_values(&values).inc_by(stats.get(outcome));
            }

            registry.register(Box::new(family))?;
        }
        Ok(())
    }

    /// Registers a standalone counter for a scalar outcome view.
    fn register_scalar(
        &self,
        registry: &Registry,
        name: &str,
        labels: &[(String, String)],
        value: u64,
    ) -> Result<()> {
        let opts = self.build_opts(&Self::sanitize_name(name), "single outcome total");

        if labels.is_empty() {
            let counter = IntCounter::with_opts(opts)?;
            counter.inc_by(value);
            registry.register(Box::new(counter))?;
        } else {
            let label_names: Vec<&str> = labels.iter().map(|(k, _)| k.as_str()).collect();
            let counter = IntCounterVec::new(opts, &label_names)?;
            let label_values: Vec<&str> = labels.iter().map(|(_, v)| v.as_str()).collect();
            counter.with_label_values(&label_values).inc_by(value);
            registry.register(Box::new(counter))?;
        }
        Ok(())
    }

    fn build_opts(&self, name: &str, help: &str) -> Opts {
        let mut opts = Opts::new(name, help);
        if let Some(ref ns) = self.namespace {
            opts = opts.namespace(ns.clone());
        }
        if !self.const_labels.is_empty() {
            opts = opts.const_labels(self.const_labels.clone());
        }
        opts
    }

    /// Encodes the registry to a string.
    fn encode_registry(&self, registry: &Registry) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| PrometheusError::EncodeError(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| PrometheusError::Utf8Error(e).into())
    }

    /// Sanitizes a metric name to be Prometheus-compatible.
    ///
    /// Prometheus metric names must match `[a-zA-Z_:][a-zA-Z0-9_:]*`.
    fn sanitize_name(name: &str) -> String {
        let mut result = String::with_capacity(name.len());
        for c in name.chars() {
            if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                result.push(c);
            } else if c == '-' || c == '.' || c == ' ' {
                result.push('_');
            }
        }
        if result.is_empty() {
            result.push_str("unnamed");
        }
        if result
            .chars()
            .next()
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false)
        {
            result.insert(0, '_');
        }
        result
    }
}

/// One source read, taken before any registry work starts.
struct Sample {
    name: String,
    labels: Vec<(String, String)>,
    value: StatValue,
}

impl Sample {
    fn read(source: &dyn Observable, reset: bool) -> Self {
        let name = if source.name().is_empty() {
            "unnamed".to_string()
        } else {
            source.name().to_string()
        };
        Sample {
            name,
            labels: source.labels().to_vec(),
            value: if reset {
                source.value_and_reset()
            } else {
                source.value()
            },
        }
    }
}

fn outcome_help(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Received => "Messages handed to the consumer.",
        Outcome::Processed => "Messages successfully handled.",
        Outcome::Dropped => "Messages discarded without processing.",
        Outcome::Rejected => "Messages explicitly rejected.",
        Outcome::Failed => "Messages whose processing raised an unrecoverable error.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Labeled;
    use crate::stats::LiveStatistics;

    #[test]
    fn test_render_empty() {
        let observer = PrometheusObserver::new();
        let sources: Vec<&dyn Observable> = vec![];
        let output = observer.render(sources.into_iter()).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_render_single_consumer() {
        let mailman = LiveStatistics::new().with_name("mailman");
        mailman.add(Outcome::Received, 100);
        mailman.add(Outcome::Failed, 2);

        let observer = PrometheusObserver::new();
        let sources: Vec<&dyn Observable> = vec![&mailman];
        let output = observer.render(sources.into_iter()).unwrap();

        assert!(output.contains(r#"messages_received_total{consumer="mailman"} 100"#));
        assert!(output.contains(r#"messages_failed_total{consumer="mailman"} 2"#));
    }

    #[test]
    fn test_render_multiple_consumers_share_families() {
        let a = LiveStatistics::new().with_name("a");
        let b = LiveStatistics::new().with_name("b");
        a.add(Outcome::Received, 10);
        b.add(Outcome::Received, 20);

        let observer = PrometheusObserver::new();
        let sources: Vec<&dyn Observable> = vec![&a, &b];
        let output = observer.render(sources.into_iter()).unwrap();

        assert!(output.contains(r#"messages_received_total{consumer="a"} 10"#));
        assert!(output.contains(r#"messages_received_total{consumer="b"} 20"#));
    }

    #[test]
    fn test_render_with_namespace() {
        let mailman = LiveStatistics::new().with_name("mailman");
        mailman.add(Outcome::Received, 1);

        let observer = PrometheusObserver::new().with_namespace("amqp");
        let sources: Vec<&dyn Observable> = vec![&mailman];
        let output = observer.render(sources.into_iter()).unwrap();

        assert!(output.contains("amqp_messages_received_total"));
    }

    #[test]
    fn test_render_adapter_labels() {
        let mailman = Labeled::new(LiveStatistics::new().with_name("mailman"))
            .with_label("queue", "updates");
        mailman.add(Outcome::Received, 5);

        let observer = PrometheusObserver::new();
        let sources: Vec<&dyn Observable> = vec![&mailman];
        let output = observer.render(sources.into_iter()).unwrap();

        assert!(output.contains(r#"consumer="mailman""#));
        assert!(output.contains(r#"queue="updates""#));
    }

    #[test]
    fn test_render_const_label() {
        let mailman = LiveStatistics::new().with_name("mailman");
        mailman.add(Outcome::Received, 1);

        let observer = PrometheusObserver::new().with_const_label("instance", "server-1");
        let sources: Vec<&dyn Observable> = vec![&mailman];
        let output = observer.render(sources.into_iter()).unwrap();

        assert!(output.contains(r#"instance="server-1""#));
    }

    #[test]
    fn test_render_scalar_view() {
        let mailman = LiveStatistics::new().with_name("mailman");
        mailman.add(Outcome::Failed, 3);
        let failed = mailman.outcome(Outcome::Failed);

        let observer = PrometheusObserver::new();
        let sources: Vec<&dyn Observable> = vec![&failed];
        let output = observer.render(sources.into_iter()).unwrap();

        assert!(output.contains("mailman_failed 3"));
    }

    #[test]
    fn test_render_and_reset() {
        let mailman = LiveStatistics::new().with_name("mailman");
        mailman.add(Outcome::Received, 5);

        let observer = PrometheusObserver::new();
        let sources: Vec<&dyn Observable> = vec![&mailman];
        let output = observer.render_and_reset(sources.into_iter()).unwrap();

        assert!(output.contains("5"));
        assert!(mailman.snapshot().is_zero());
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(
            PrometheusObserver::sanitize_name("mailman.failed"),
            "mailman_failed"
        );
        assert_eq!(PrometheusObserver::sanitize_name(""), "unnamed");
        assert_eq!(PrometheusObserver::sanitize_name("1abc"), "_1abc");
    }
}
