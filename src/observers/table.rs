//! Table observer for pretty-printing consumer statistics.
//!
//! This module provides [`TableObserver`], which renders a collection of
//! [`Observable`] statistics sources as a formatted ASCII table using the
//! `tabled` crate: one row per consumer, one column per outcome.
//!
//! # Feature Flag
//!
//! This module requires the `table` feature:
//!
//! ```toml
//! [dependencies]
//! statistiche = { version = "0.3", features = ["table"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use statistiche::stats::{LiveStatistics, Observable, Outcome};
//! use statistiche::observers::table::{TableObserver, TableStyle};
//!
//! let mailman = LiveStatistics::new().with_name("mailman");
//! let archiver = LiveStatistics::new().with_name("archiver");
//!
//! mailman.add(Outcome::Received, 1000);
//! mailman.add(Outcome::Processed, 995);
//! archiver.add(Outcome::Received, 120);
//!
//! let sources: Vec<&dyn Observable> = vec![&mailman, &archiver];
//!
//! let observer = TableObserver::new().with_style(TableStyle::Rounded);
//! println!("{}", observer.render(sources.into_iter()));
//! // ╭──────────┬──────────┬───────────┬─────────┬──────────┬────────╮
//! // │ Consumer │ Received │ Processed │ Dropped │ Rejected │ Failed │
//! // ├──────────┼──────────┼───────────┼─────────┼──────────┼────────┤
//! // │ mailman  │ 1000     │ 995       │ 0       │ 0        │ 0      │
//! // │ archiver │ 120      │ 0         │ 0       │ 0        │ 0      │
//! // ╰──────────┴──────────┴───────────┴─────────┴──────────┴────────╯
//! ```

use crate::stats::{ConsumerStatistics, Observable, StatValue};
use tabled::{settings::Style, Table, Tabled};

/// Available table styles for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// ASCII table with simple characters: +, -, |
    Ascii,
    /// Modern rounded corners (default)
    #[default]
    Rounded,
    /// Sharp corners with box-drawing characters
    Sharp,
    /// Modern style with clean lines
    Modern,
    /// GitHub-flavored Markdown table
    Markdown,
    /// Dots for borders
    Dots,
    /// No borders, just spacing
    Blank,
}

/// Configuration for the table observer.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// The style to use for rendering.
    pub style: TableStyle,
    /// Whether to show the header row.
    pub show_header: bool,
    /// Custom title for the table (optional).
    pub title: Option<String>,
    /// Whether to append a fleet-wide totals row.
    pub totals: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            style: TableStyle::default(),
            show_header: true,
            title: None,
            totals: false,
        }
    }
}

/// Internal row representation for tabled.
#[derive(Tabled)]
struct ConsumerRow {
    #[tabled(rename = "Consumer")]
    name: String,
    #[tabled(rename = "Received")]
    received: u64,
    #[tabled(rename = "Processed")]
    processed: u64,
    #[tabled(rename = "Dropped")]
    dropped: u64,
    #[tabled(rename = "Rejected")]
    rejected: u64,
    #[tabled(rename = "Failed")]
    failed: u64,
}

impl ConsumerRow {
    fn new(name: String, stats: &ConsumerStatistics) -> Self {
        ConsumerRow {
            name,
            received: stats.received,
            processed: stats.processed,
            dropped: stats.dropped,
            rejected: stats.rejected,
            failed: stats.failed,
        }
    }
}

/// An observer that renders consumer statistics as a formatted ASCII table.
///
/// One row per consumer, one column per outcome. Sources yielding scalar
/// counts are skipped; a bare count has no outcome column to sit in.
///
/// # Examples
///
/// ```rust,ignore
/// use statistiche::observers::table::{TableObserver, TableStyle};
///
/// let observer = TableObserver::new()
///     .with_style(TableStyle::Markdown)
///     .with_totals(true);
///
/// println!("{}", observer.render(sources.into_iter()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableObserver {
    config: TableConfig,
}

impl TableObserver {
    /// Creates a new table observer with default settings.
    ///
    /// Default style is [`TableStyle::Rounded`] with a header and no totals
    /// row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new table observer with the specified configuration.
    pub fn with_config(config: TableConfig) -> Self {
        Self { config }
    }

    /// Sets the table style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.config.style = style;
        self
    }

    /// Sets whether to show the header row.
    pub fn with_header(mut self, show: bool) -> Self {
        self.config.show_header = show;
        self
    }

    /// Sets an optional title printed above the table.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    /// Enables or disables the fleet-wide totals row.
    ///
    /// The totals row is labeled `total` and holds the field-wise sum of
    /// every rendered consumer.
    pub fn with_totals(mut self, enabled: bool) -> Self {
        self.config.totals = enabled;
        self
    }

    /// Renders the sources as a formatted table string.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use statistiche::stats::{LiveStatistics, Observable, Outcome};
    /// use statistiche::observers::table::TableObserver;
    ///
    /// let mailman = LiveStatistics::new().with_name("mailman");
    /// mailman.add(Outcome::Received, 100);
    ///
    /// let sources: Vec<&dyn Observable> = vec![&mailman];
    /// let table = TableObserver::new().with_totals(true).render(sources.into_iter());
    /// ```
    pub fn render<'a>(&self, sources: impl Iterator<Item = &'a dyn Observable>) -> String {
        self.render_reads(sources.map(|s| (row_name(s), s.value())))
    }

    /// Renders the sources as a formatted table string, draining them.
    ///
    /// Useful for periodic reporting where each table should show only the
    /// outcomes recorded since the previous render.
    pub fn render_and_reset<'a>(
        &self,
        sources: impl Iterator<Item = &'a dyn Observable>,
    ) -> String {
        self.render_reads(sources.map(|s| (row_name(s), s.value_and_reset())))
    }

    fn render_reads(&self, reads: impl Iterator<Item = (String, StatValue)>) -> String {
        let mut rows = Vec::new();
        let mut total = ConsumerStatistics::new();

        for (name, value) in reads {
            if let StatValue::Statistics(stats) = value {
                total += stats;
                rows.push(ConsumerRow::new(name, &stats));
            }
        }

        if self.config.totals {
            rows.push(ConsumerRow::new("total".to_string(), &total));
        }

        let mut table = Table::new(&rows);
        self.apply_style(&mut table);

        if !self.config.show_header {
            table.with(tabled::settings::Remove::row(
                tabled::settings::object::Rows::first(),
            ));
        }

        if let Some(ref title) = self.config.title {
            format!("{}\n{}", title, table)
        } else {
            table.to_string()
        }
    }

    /// Applies the configured style to a table.
    fn apply_style(&self, table: &mut Table) {
        match self.config.style {
            TableStyle::Ascii => {
                table.with(Style::ascii());
            }
            TableStyle::Rounded => {
                table.with(Style::rounded());
            }
            TableStyle::Sharp => {
                table.with(Style::sharp());
            }
            TableStyle::Modern => {
                table.with(Style::modern());
            }
            TableStyle::Markdown => {
                table.with(Style::markdown());
            }
            TableStyle::Dots => {
                table.with(Style::dots());
            }
            TableStyle::Blank => {
                table.with(Style::blank());
            }
        }
    }
}

fn row_name(source: &dyn Observable) -> String {
    if source.name().is_empty() {
        "(unnamed)".to_string()
    } else {
        source.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{LiveStatistics, Outcome};

    #[test]
    fn test_render_rows() {
        let mailman = LiveStatistics::new().with_name("mailman");
        let archiver = LiveStatistics::new().with_name("archiver");
        mailman.add(Outcome::Received, 1000);
        archiver.add(Outcome::Dropped, 7);

        let sources: Vec<&dyn Observable> = vec![&mailman, &archiver];
        let output = TableObserver::new().render(sources.into_iter());

        assert!(output.contains("Consumer"));
        assert!(output.contains("mailman"));
        assert!(output.contains("archiver"));
        assert!(output.contains("1000"));
        assert!(output.contains("7"));
    }

    #[test]
    fn test_render_totals_row() {
        let a = LiveStatistics::new().with_name("a");
        let b = LiveStatistics::new().with_name("b");
        a.add(Outcome::Received, 10);
        b.add(Outcome::Received, 5);

        let sources: Vec<&dyn Observable> = vec![&a, &b];
        let output = TableObserver::new()
            .with_totals(true)
            .render(sources.into_iter());

        assert!(output.contains("total"));
        assert!(output.contains("15"));
    }

    #[test]
    fn test_render_skips_scalar_sources() {
        let mailman = LiveStatistics::new().with_name("mailman");
        mailman.add(Outcome::Failed, 3);
        let view = mailman.outcome(Outcome::Failed);

        let sources: Vec<&dyn Observable> = vec![&mailman, &view];
        let output = TableObserver::new().render(sources.into_iter());

        assert!(!output.contains("mailman.failed"));
    }

    #[test]
    fn test_render_without_header() {
        let mailman = LiveStatistics::new().with_name("mailman");
        let sources: Vec<&dyn Observable> = vec![&mailman];
        let output = TableObserver::new()
            .with_header(false)
            .render(sources.into_iter());

        assert!(!output.contains("Consumer"));
        assert!(output.contains("mailman"));
    }

    #[test]
    fn test_render_with_title() {
        let mailman = LiveStatistics::new().with_name("mailman");
        let sources: Vec<&dyn Observable> = vec![&mailman];
        let output = TableObserver::new()
            .with_title("fleet statistics")
            .render(sources.into_iter());

        assert!(output.starts_with("fleet statistics\n"));
    }

    #[test]
    fn test_markdown_style() {
        let mailman = LiveStatistics::new().with_name("mailman");
        let sources: Vec<&dyn Observable> = vec![&mailman];
        let output = TableObserver::new()
            .with_style(TableStyle::Markdown)
            .render(sources.into_iter());

        assert!(output.contains('|'));
    }

    #[test]
    fn test_unnamed_source() {
        let stats = LiveStatistics::new();
        let sources: Vec<&dyn Observable> = vec![&stats];
        let output = TableObserver::new().render(sources.into_iter());
        assert!(output.contains("(unnamed)"));
    }

    #[test]
    fn test_render_and_reset_drains() {
        let mailman = LiveStatistics::new().with_name("mailman");
        mailman.add(Outcome::Received, 9);

        let sources: Vec<&dyn Observable> = vec![&mailman];
        let output = TableObserver::new().render_and_reset(sources.into_iter());

        assert!(output.contains("9"));
        assert!(mailman.snapshot().is_zero());
    }

    #[test]
    fn test_render_empty() {
        let sources: Vec<&dyn Observable> = vec![];
        // nothing to show, but rendering must not panic
        let _ = TableObserver::new().render(sources.into_iter());
    }
}
