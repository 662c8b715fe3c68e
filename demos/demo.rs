//! Demo application simulating a consumer fleet and rendering its statistics.
//!
//! Run with:
//! ```bash
//! cargo run --example demo --features demo -- --help
//! ```

use clap::{Parser, ValueEnum};
use statistiche::adapters::Labeled;
use statistiche::observers::json::JsonObserver;
use statistiche::observers::prometheus::PrometheusObserver;
use statistiche::observers::table::{TableObserver, TableStyle};
use statistiche::stats::{LiveStatistics, Observable, Outcome};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Output format for statistics rendering.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty ASCII table, one row per consumer
    Table,
    /// JSON format
    Json,
    /// Prometheus exposition format
    Prometheus,
}

/// Table style selection.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StyleChoice {
    Ascii,
    #[default]
    Rounded,
    Sharp,
    Modern,
    Markdown,
    Dots,
    Blank,
}

impl From<StyleChoice> for TableStyle {
    fn from(choice: StyleChoice) -> Self {
        match choice {
            StyleChoice::Ascii => TableStyle::Ascii,
            StyleChoice::Rounded => TableStyle::Rounded,
            StyleChoice::Sharp => TableStyle::Sharp,
            StyleChoice::Modern => TableStyle::Modern,
            StyleChoice::Markdown => TableStyle::Markdown,
            StyleChoice::Dots => TableStyle::Dots,
            StyleChoice::Blank => TableStyle::Blank,
        }
    }
}

/// Demo application for statistiche - consumer statistics aggregation.
///
/// This demo creates a small fleet of message consumers, optionally simulates
/// concurrent message handling, and renders the fleet statistics in various
/// formats.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Table style (for table format)
    #[arg(short, long, value_enum, default_value = "rounded")]
    style: StyleChoice,

    /// Append a fleet-wide totals row (table format)
    #[arg(long)]
    totals: bool,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,

    /// Include timestamp in JSON output
    #[arg(long)]
    timestamp: bool,

    /// Prometheus metric namespace (prefix)
    #[arg(long, default_value = "demo")]
    namespace: String,

    /// Prometheus instance label
    #[arg(long)]
    instance: Option<String>,

    /// Simulate concurrent message handling with N threads per consumer
    #[arg(long)]
    simulate: Option<usize>,

    /// Number of messages per thread in simulation
    #[arg(long, default_value = "10000")]
    messages: usize,

    /// Reset statistics after reading (show per-render deltas)
    #[arg(long)]
    reset: bool,

    /// Add a title to the output (table format)
    #[arg(long)]
    title: Option<String>,

    /// Watch mode: refresh every N milliseconds
    #[arg(short, long)]
    watch: Option<u64>,

    /// Hide header in table mode
    #[arg(long)]
    no_header: bool,
}

/// Creates the demo fleet with some initial traffic.
fn create_fleet() -> (
    Labeled<LiveStatistics>,
    Labeled<LiveStatistics>,
    LiveStatistics,
) {
    let mailman = Labeled::new(LiveStatistics::new().with_name("mailman"))
        .with_label("queue", "updates")
        .with_label("exchange", "amq.topic");
    let archiver = Labeled::new(LiveStatistics::new().with_name("archiver"))
        .with_label("queue", "archive")
        .with_label("exchange", "amq.topic");
    let indexer = LiveStatistics::new().with_name("indexer");

    // Some traffic so the first render has something to show
    mailman.add(Outcome::Received, 1000);
    mailman.add(Outcome::Processed, 995);
    mailman.add(Outcome::Dropped, 3);
    mailman.add(Outcome::Failed, 2);
    archiver.add(Outcome::Received, 120);
    archiver.add(Outcome::Processed, 120);
    indexer.add(Outcome::Received, 64);
    indexer.add(Outcome::Processed, 60);
    indexer.add(Outcome::Rejected, 4);

    (mailman, archiver, indexer)
}

/// Classifies message `j` on thread `i` with a realistic outcome mix.
fn classify(i: usize, j: usize) -> Outcome {
    match (i * 31 + j) % 50 {
        0 => Outcome::Failed,
        1 | 2 => Outcome::Rejected,
        3..=5 => Outcome::Dropped,
        _ => Outcome::Processed,
    }
}

/// Simulates concurrent message handling across the fleet.
fn simulate_traffic(
    mailman: &Arc<Labeled<LiveStatistics>>,
    archiver: &Arc<Labeled<LiveStatistics>>,
    indexer: &Arc<LiveStatistics>,
    num_threads: usize,
    messages: usize,
) {
    let mut handles = vec![];

    for i in 0..num_threads {
        let mailman = Arc::clone(mailman);
        let archiver = Arc::clone(archiver);
        let indexer = Arc::clone(indexer);

        let handle = thread::spawn(move || {
            for j in 0..messages {
                mailman.record(Outcome::Received);
                mailman.record(classify(i, j));

                // the archiver sees a tenth of the traffic and never fails
                if j % 10 == 0 {
                    archiver.record(Outcome::Received);
                    archiver.record(Outcome::Processed);
                }

                if j % 3 == 0 {
                    indexer.record(Outcome::Received);
                    indexer.record(classify(i, j / 3));
                }
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

/// Renders the fleet in the specified format.
fn render_output(args: &Args, sources: Vec<&dyn Observable>) -> String {
    match args.format {
        OutputFormat::Table => {
            let mut observer = TableObserver::new()
                .with_style(args.style.into())
                .with_header(!args.no_header)
                .with_totals(args.totals);

            if let Some(ref title) = args.title {
                observer = observer.with_title(title.clone());
            }

            if args.reset {
                observer.render_and_reset(sources.into_iter())
            } else {
                observer.render(sources.into_iter())
            }
        }

        OutputFormat::Json => {
            let observer = JsonObserver::new()
                .pretty(args.pretty)
                .wrap_in_snapshot(args.timestamp)
                .include_timestamp(args.timestamp);

            if args.reset {
                observer.to_json_and_reset(sources.into_iter())
            } else {
                observer.to_json(sources.into_iter())
            }
            .unwrap_or_else(|e| format!("Error: {}", e))
        }

        OutputFormat::Prometheus => {
            let mut observer = PrometheusObserver::new().with_namespace(&args.namespace);

            if let Some(ref instance) = args.instance {
                observer = observer.with_const_label("instance", instance);
            }

            if args.reset {
                observer.render_and_reset(sources.into_iter())
            } else {
                observer.render(sources.into_iter())
            }
            .unwrap_or_else(|e| format!("Error: {}", e))
        }
    }
}

fn main() {
    let args = Args::parse();

    let (mailman, archiver, indexer) = create_fleet();

    // Wrap in Arc for potential simulation
    let mailman = Arc::new(mailman);
    let archiver = Arc::new(archiver);
    let indexer = Arc::new(indexer);

    if let Some(num_threads) = args.simulate {
        eprintln!(
            "Simulating {} threads x {} messages...",
            num_threads, args.messages
        );
        simulate_traffic(&mailman, &archiver, &indexer, num_threads, args.messages);
        eprintln!("Simulation complete.\n");
    }

    if let Some(interval_ms) = args.watch {
        loop {
            // Clear screen (ANSI escape code)
            print!("\x1B[2J\x1B[1;1H");

            let sources: Vec<&dyn Observable> =
                vec![mailman.as_ref(), archiver.as_ref(), indexer.as_ref()];

            println!("{}", render_output(&args, sources));

            thread::sleep(Duration::from_millis(interval_ms));
        }
    } else {
        let sources: Vec<&dyn Observable> =
            vec![mailman.as_ref(), archiver.as_ref(), indexer.as_ref()];

        println!("{}", render_output(&args, sources));
    }
}
