//! Wrapper types for extending statistics sources.
//!
//! This module provides wrappers that add behavior to a statistics source
//! while keeping it compatible with the [`Observable`](crate::stats::Observable)
//! trait.
//!
//! # Available Wrappers
//!
//! | Wrapper | Description |
//! |---------|-------------|
//! | [`Labeled`] | Adds key-value labels (queue, exchange, routing key) to a source |
//! | [`Windowed`] | Makes collection return per-interval deltas (reset on read) |
//!
//! # Examples
//!
//! ## Labeled Source
//!
//! ```rust
//! use statistiche::stats::LiveStatistics;
//! use statistiche::adapters::Labeled;
//!
//! let consumer = Labeled::new(LiveStatistics::new().with_name("mailman"))
//!     .with_label("queue", "updates")
//!     .with_label("exchange", "amq.topic");
//!
//! for (key, value) in consumer.labels() {
//!     println!("{}: {}", key, value);
//! }
//! ```
//!
//! ## Windowed Source
//!
//! ```rust
//! use statistiche::stats::{LiveStatistics, Observable, Outcome};
//! use statistiche::adapters::Windowed;
//!
//! let per_interval = Windowed::new(LiveStatistics::new().with_name("mailman"));
//! per_interval.record(Outcome::Received);
//!
//! // value() returns the delta since the previous read
//! assert!(!per_interval.value().is_zero());
//! assert!(per_interval.value().is_zero());
//! ```

mod labeled;
mod windowed;

pub use labeled::Labeled;
pub use windowed::Windowed;
