//! Observer implementations for exporting consumer statistics.
//!
//! This module provides the export surface of the crate:
//!
//! - [`table`] - Pretty-print per-consumer statistics as tables using the `tabled` crate
//! - [`json`] - Serialize statistics to JSON format
//! - [`prometheus`] - Render statistics in Prometheus exposition format
//!
//! Observers read from any iterator of
//! [`Observable`](crate::stats::Observable) sources; they only ever see
//! snapshots, so rendering never blocks a consumer.
//!
//! # Unified Error Handling
//!
//! All observers use a unified [`ObserverError`] type, allowing you to switch
//! between observers without changing error handling code.
//!
//! # Feature Flags
//!
//! Each observer is gated behind a feature flag to minimize dependencies:
//!
//! - `table` - Enables the [`table`] module
//! - `json` - Enables the [`json`] module
//! - `prometheus` - Enables the [`prometheus`] module
//! - `full` - Enables all observer modules
//!
//! # Example
//!
//! ```rust,ignore
//! use statistiche::stats::{LiveStatistics, Observable};
//! use statistiche::observers::Result;
//!
//! static MAILMAN: LiveStatistics = LiveStatistics::new().with_name("mailman");
//! static ARCHIVER: LiveStatistics = LiveStatistics::new().with_name("archiver");
//!
//! fn export_statistics() -> Result<()> {
//!     let sources: &[&'static dyn Observable] = &[&MAILMAN, &ARCHIVER];
//!
//!     #[cfg(feature = "table")]
//!     {
//!         use statistiche::observers::table::TableObserver;
//!         let observer = TableObserver::new();
//!         println!("{}", observer.render(sources.iter().copied()));
//!     }
//!
//!     #[cfg(feature = "json")]
//!     {
//!         use statistiche::observers::json::JsonObserver;
//!         let observer = JsonObserver::new().pretty(true);
//!         println!("{}", observer.to_json(sources.iter().copied())?);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod error;

pub use error::{ObserverError, Result};

#[cfg(feature = "prometheus")]
pub use error::PrometheusError;

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "prometheus")]
pub mod prometheus;
