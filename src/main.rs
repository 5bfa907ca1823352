//! CLI entry point for the trip flow mapper.
//!
//! Provides subcommands for filtering raw trip exports, rendering per-metric
//! station maps, and printing ranked station reports.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use trip_flow_mapper::filter::{self, MANDATORY_ATTRIBUTES, ValueFilter};
use trip_flow_mapper::map::write_map;
use trip_flow_mapper::network::metrics;
use trip_flow_mapper::network::rank::{RankKey, rank};
use trip_flow_mapper::network::registry::StationRegistry;
use trip_flow_mapper::network::types::TripRow;
use trip_flow_mapper::output::{print_report, station_index, write_station_index};

#[derive(Parser)]
#[command(name = "trip_flow_mapper")]
#[command(about = "A tool to map bike-share station traffic networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a raw trip CSV into the cleaned flat export
    Filter {
        /// Path to the raw trip CSV
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Cleaned CSV to write
        #[arg(short, long, default_value = "cleaned_trips.csv")]
        output: PathBuf,

        /// Comma-separated attribute names to keep (mandatory attributes are
        /// always kept; default keeps every column)
        #[arg(short, long)]
        attributes: Option<String>,

        /// Keep only rows with these member_casual values (comma-separated)
        #[arg(long)]
        member_types: Option<String>,

        /// Keep only rows with these rideable_type values (comma-separated)
        #[arg(long)]
        rideable_types: Option<String>,

        /// Choose attributes and value filters through stdin prompts
        #[arg(short, long, default_value_t = false)]
        interactive: bool,
    },
    /// Render one station map per metric from a cleaned CSV
    Map {
        /// Path to the cleaned trip CSV
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Directory the map HTML files are written to
        #[arg(short, long, default_value = "maps")]
        output_dir: PathBuf,

        /// Comma-separated metrics to render
        #[arg(
            short,
            long,
            default_value = "outgoing_edges,incoming_edges,net_flow"
        )]
        metrics: String,
    },
    /// Print ranked station metrics
    Report {
        /// Path to the cleaned trip CSV
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Metric to rank by
        #[arg(short, long, default_value = "outgoing_edges")]
        key: String,

        /// Only print the top N stations
        #[arg(short, long)]
        top: Option<usize>,

        /// Also write the ranked index as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/trip_flow_mapper.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("trip_flow_mapper.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Filter {
            input,
            output,
            attributes,
            member_types,
            rideable_types,
            interactive,
        } => {
            run_filter(
                &input,
                &output,
                attributes,
                member_types,
                rideable_types,
                interactive,
            )?;
        }
        Commands::Map {
            input,
            output_dir,
            metrics,
        } => {
            let mut keys = Vec::new();
            for name in metrics.split(',') {
                keys.push(RankKey::from_str(name.trim())?);
            }

            let registry = build_network(&input)?;
            let ranked = rank(registry.stations().collect(), RankKey::OutgoingEdges);

            for key in keys {
                write_map(&output_dir, &ranked, key)?;
            }
        }
        Commands::Report {
            input,
            key,
            top,
            json,
        } => {
            let key = RankKey::from_str(&key)?;
            let registry = build_network(&input)?;
            let ranked = rank(registry.stations().collect(), key);

            print_report(&ranked, top);

            if let Some(path) = json {
                let index = station_index(&ranked, key);
                write_station_index(&path, &index)?;
            }
        }
    }

    Ok(())
}

/// Reads a cleaned trip CSV, builds the station registry, and computes the
/// derived metrics.
fn build_network(path: &Path) -> Result<StationRegistry> {
    let rows = load_rows(path)?;
    info!(rows = rows.len(), "Trip rows loaded");

    let mut registry = StationRegistry::build(&rows)?;
    metrics::compute(&mut registry);
    info!(stations = registry.len(), "Station network computed");

    Ok(registry)
}

fn load_rows(path: &Path) -> Result<Vec<TripRow>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: TripRow = result?;
        rows.push(row);
    }

    Ok(rows)
}

/// Runs the record filter: attribute selection (flags or interactive
/// prompts), value filters, null-row dropping, cleaned CSV export.
fn run_filter(
    input: &Path,
    output: &Path,
    attributes: Option<String>,
    member_types: Option<String>,
    rideable_types: Option<String>,
    interactive: bool,
) -> Result<()> {
    let headers = filter::read_headers(input)?;
    filter::check_mandatory(&headers)?;

    let selection = if interactive {
        prompt_attribute_selection(&headers)?
    } else if let Some(names) = attributes {
        filter::select_by_names(&split_list(&names), &headers)?
    } else {
        headers.clone()
    };

    info!(attributes = selection.len(), "Attribute selection resolved");

    let mut value_filters = Vec::new();
    for (column, keep) in [
        ("member_casual", member_types),
        ("rideable_type", rideable_types),
    ] {
        if let Some(keep) = keep {
            value_filters.push(ValueFilter {
                column: column.to_string(),
                keep: split_list(&keep),
            });
        } else if interactive && selection.iter().any(|c| c == column) {
            if let Some(filter) = prompt_value_filter(input, column)? {
                value_filters.push(filter);
            }
        }
    }

    filter::filter_trips(input, output, &selection, &value_filters)?;
    Ok(())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lists the columns with indices and reads an index selection from stdin
/// (`100` = mandatory only, `101` = everything).
fn prompt_attribute_selection(columns: &[String]) -> Result<Vec<String>> {
    for (index, attribute) in columns.iter().enumerate() {
        if MANDATORY_ATTRIBUTES.contains(&attribute.as_str()) {
            println!("{index}. {attribute} (Mandatory)");
        } else {
            println!("{index}. {attribute}");
        }
    }
    println!();
    println!("Select attributes by entering their listed numbers, separated by commas.");
    println!("Mandatory attributes are included regardless of your selection.");
    println!("Enter {} to keep only the mandatory attributes.", filter::SELECT_MANDATORY);
    println!("Enter {} to keep all attributes.", filter::SELECT_ALL);

    let line = read_line("Your selection: ")?;
    let selection = filter::parse_index_selection(&line, columns);

    println!("\nYou've selected:");
    for attribute in &selection {
        println!("{attribute}");
    }

    Ok(selection)
}

/// Lists the distinct values of `column` and reads an index selection from
/// stdin. An empty selection keeps every value (no filter).
fn prompt_value_filter(input: &Path, column: &str) -> Result<Option<ValueFilter>> {
    let values = filter::unique_values(input, column)?;
    if values.is_empty() {
        return Ok(None);
    }

    println!("Available {column} values:");
    for (index, value) in values.iter().enumerate() {
        println!("{index}. {value}");
    }

    let line = read_line("Select values by index (comma-separated, empty keeps all): ")?;
    let keep: Vec<String> = line
        .split(',')
        .filter_map(|part| part.trim().parse::<usize>().ok())
        .filter_map(|idx| values.get(idx).cloned())
        .collect();

    if keep.is_empty() {
        return Ok(None);
    }

    Ok(Some(ValueFilter {
        column: column.to_string(),
        keep,
    }))
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
