//! # Statistiche - Consumer Statistics for Message-Bus Consumers
//!
//! A Rust library for counting, snapshotting, and aggregating the lifecycle
//! outcomes of consumed messages. Every message a consumer takes off the bus
//! is classified exactly once - received on intake, then processed, dropped,
//! rejected, or failed - and this library provides the counter objects that
//! record those classifications and combine them across a fleet of consumers
//! safely and predictably.
//!
//! ## The Model
//!
//! Two kinds of counter cover the two sides of the problem:
//!
//! 1. **[`ConsumerStatistics`](stats::ConsumerStatistics)** - a pure value
//!    type with one non-negative count per outcome. Owned and mutated by a
//!    single execution context; combined with `+`, which allocates a fresh
//!    result and never touches an operand. This is the unit of exchange:
//!    snapshots, aggregates, and exports are all values of this type.
//!
//! 2. **[`LiveStatistics`](stats::LiveStatistics)** - a lock-free
//!    accumulator for consumers whose handlers run on many threads. Storage
//!    is sharded across 64 cache-line-padded slots so concurrent recording
//!    does not contend; reading produces a `ConsumerStatistics` snapshot.
//!
//! Aggregation never shares mutable state:
//!
//! ```text
//!   consumer A ──owns──► LiveStatistics ──snapshot──► ConsumerStatistics ─┐
//!   consumer B ──owns──► LiveStatistics ──snapshot──► ConsumerStatistics ─┼─ + ──► fleet total
//!   consumer C ──owns──► LiveStatistics ──snapshot──► ConsumerStatistics ─┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use statistiche::registry::ConsumerRegistry;
//! use statistiche::stats::Outcome;
//!
//! let registry = ConsumerRegistry::new();
//!
//! // each consumer owns a live counter
//! let mailman = registry.register_consumer("mailman");
//! let archiver = registry.register_consumer("archiver");
//!
//! // the consumption path records one outcome per message
//! mailman.record(Outcome::Received);
//! mailman.record(Outcome::Processed);
//! archiver.record(Outcome::Received);
//! archiver.record(Outcome::Dropped);
//!
//! // the coordinating side folds snapshots into one fleet view
//! let fleet = registry.aggregate().unwrap();
//! assert_eq!(fleet.received, 2);
//! assert_eq!(fleet.processed, 1);
//! assert_eq!(fleet.dropped, 1);
//! ```
//!
//! ## The Value Type
//!
//! The five-field counter follows a fixed contract: the field set is closed,
//! addition is pure, and the string representation is byte-stable.
//!
//! ```rust
//! use statistiche::stats::ConsumerStatistics;
//!
//! let mut stats = ConsumerStatistics::new();
//! stats.received = 42;
//! stats.processed = 43;
//!
//! assert_eq!(
//!     stats.to_string(),
//!     "<ConsumerStatistics {'received': 42, 'processed': 43, 'dropped': 0, \
//!      'rejected': 0, 'failed': 0}>"
//! );
//!
//! // dynamic field access is checked against the fixed field set
//! assert!(stats.set_named("dummy", 1).is_err());
//! ```
//!
//! ## Adapters
//!
//! Wrappers extend a source without changing its counters:
//!
//! | Adapter | Description |
//! |---------|-------------|
//! | [`Labeled`](adapters::Labeled) | Attaches queue/exchange/routing-key labels for export |
//! | [`Windowed`](adapters::Windowed) | Collection returns per-interval deltas (reset on read) |
//!
//! ## Observers
//!
//! The export surface is feature-gated, one observer per format:
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | `table` | [`observers::table`] | Pretty-print the fleet as an ASCII table |
//! | `json` | [`observers::json`] | Serialize statistics to JSON |
//! | `prometheus` | [`observers::prometheus`] | Render Prometheus exposition format |
//! | `full` | All observers | Enables all observer modules |
//!
//! ### Example: Table Output
//!
//! ```toml
//! [dependencies]
//! statistiche = { version = "0.3", features = ["table"] }
//! ```
//!
//! ```rust,ignore
//! use statistiche::observers::table::TableObserver;
//!
//! let table = TableObserver::new().with_totals(true);
//! registry.with_sources(|sources| {
//!     println!("{}", table.render(sources.iter().map(|s| s.as_ref() as &dyn Observable)));
//! });
//! // ╭──────────┬──────────┬───────────┬─────────┬──────────┬────────╮
//! // │ Consumer │ Received │ Processed │ Dropped │ Rejected │ Failed │
//! // ├──────────┼──────────┼───────────┼─────────┼──────────┼────────┤
//! // │ mailman  │ 1000     │ 995       │ 3       │ 0        │ 2      │
//! // │ archiver │ 120      │ 120       │ 0       │ 0        │ 0      │
//! // │ total    │ 1120     │ 1115      │ 3       │ 0        │ 2      │
//! // ╰──────────┴──────────┴───────────┴─────────┴──────────┴────────╯
//! ```
//!
//! ### Example: JSON Output
//!
//! ```rust,ignore
//! use statistiche::observers::json::JsonObserver;
//!
//! let json = JsonObserver::new()
//!     .pretty(true)
//!     .to_json(sources.into_iter())?;
//! ```
//!
//! ### Example: Prometheus Output
//!
//! ```rust,ignore
//! use statistiche::observers::prometheus::PrometheusObserver;
//!
//! let output = PrometheusObserver::new()
//!     .with_namespace("amqp")
//!     .with_const_label("instance", "server-1")
//!     .render(sources.into_iter())?;
//! // messages_received_total{consumer="mailman"} 1000
//! ```
//!
//! ## Thread Safety
//!
//! [`LiveStatistics`](stats::LiveStatistics) is `Send + Sync` and is shared
//! across threads via `Arc`. The pure value type is deliberately not
//! synchronized: one instance belongs to one execution context, and all
//! cross-thread combination goes through snapshots. Concurrent mutation of a
//! single `ConsumerStatistics` is a design error this library does not
//! paper over.
//!
//! ## Serialization
//!
//! With the `serde` feature, the value type and the [`snapshot`] module
//! serialize with field order preserved, so exported statistics read in the
//! same canonical order everywhere.

pub mod adapters;
pub mod observers;
pub mod registry;
pub mod stats;

#[cfg(feature = "serde")]
pub mod snapshot;
