//! Raw trip CSV filtering: attribute selection, value filters, and the
//! cleaned flat export.
//!
//! This is the ingestion side of the pipeline. It projects a selected subset
//! of columns (the mandatory ones are always kept), optionally restricts rows
//! by membership or rideable type, drops rows with any empty selected cell,
//! and writes the cleaned CSV consumed by the network stage.

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Columns the pipeline cannot work without. They are always part of the
/// selection, whatever the caller asked for.
pub const MANDATORY_ATTRIBUTES: [&str; 8] = [
    "start_station_name",
    "start_station_id",
    "end_station_name",
    "end_station_id",
    "start_lat",
    "start_lng",
    "end_lat",
    "end_lng",
];

/// Selection code for "mandatory attributes only".
pub const SELECT_MANDATORY: &str = "100";
/// Selection code for "all attributes".
pub const SELECT_ALL: &str = "101";

/// Row accounting for one filter run.
#[derive(Debug, Default, PartialEq)]
pub struct FilterSummary {
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_dropped: usize,
}

/// Optional value filter on a single column: keep a row only when the
/// column's cell is one of the listed values.
#[derive(Debug, Clone)]
pub struct ValueFilter {
    pub column: String,
    pub keep: Vec<String>,
}

/// Reads the header row of a trip CSV.
pub fn read_headers(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = ReaderBuilder::new().from_reader(file);
    let headers = reader
        .headers()
        .with_context(|| format!("reading headers of {}", path.display()))?;
    Ok(headers.iter().map(str::to_string).collect())
}

/// Ensures every mandatory attribute is present among the CSV columns.
pub fn check_mandatory(columns: &[String]) -> Result<()> {
    for attribute in MANDATORY_ATTRIBUTES {
        if !columns.iter().any(|c| c == attribute) {
            bail!("mandatory attribute '{attribute}' not found in data");
        }
    }
    Ok(())
}

/// Projects a selection given by column name. Unknown names are rejected;
/// mandatory attributes are appended when missing from the request.
pub fn select_by_names(names: &[String], columns: &[String]) -> Result<Vec<String>> {
    let mut selected = Vec::new();
    for name in names {
        if !columns.iter().any(|c| c == name) {
            bail!("attribute '{name}' not found in data");
        }
        if !selected.contains(name) {
            selected.push(name.clone());
        }
    }
    append_mandatory(&mut selected);
    Ok(selected)
}

/// Parses an interactive index selection against the column list.
///
/// `100` selects the mandatory attributes only and `101` selects every
/// column; otherwise the input is a comma-separated list of column indices.
/// Non-numeric entries and out-of-range indices are ignored. Mandatory
/// attributes are appended regardless of the selection.
pub fn parse_index_selection(input: &str, columns: &[String]) -> Vec<String> {
    let trimmed = input.trim();
    if trimmed == SELECT_MANDATORY {
        return MANDATORY_ATTRIBUTES.iter().map(|a| a.to_string()).collect();
    }
    if trimmed == SELECT_ALL {
        return columns.to_vec();
    }

    let mut selected: Vec<String> = Vec::new();
    for column in trimmed
        .split(',')
        .filter_map(|part| part.trim().parse::<usize>().ok())
        .filter_map(|idx| columns.get(idx).cloned())
    {
        if !selected.contains(&column) {
            selected.push(column);
        }
    }
    append_mandatory(&mut selected);
    selected
}

fn append_mandatory(selected: &mut Vec<String>) {
    for attribute in MANDATORY_ATTRIBUTES {
        if !selected.iter().any(|c| c == attribute) {
            selected.push(attribute.to_string());
        }
    }
}

/// Distinct values of a column, in first-appearance order. Used to present
/// the membership/rideable choices in interactive mode.
pub fn unique_values(path: &Path, column: &str) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = ReaderBuilder::new().from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let Some(col_idx) = headers.iter().position(|h| h == column) else {
        bail!("attribute '{column}' not found in data");
    };

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        let value = record.get(col_idx).unwrap_or("");
        if !value.is_empty() && !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
    Ok(values)
}

/// Streams the raw trip CSV through the filter and writes the cleaned export.
///
/// Rows are projected onto `selection`, dropped when any selected cell is
/// empty, and dropped when a [`ValueFilter`] excludes them. The output file
/// carries the selected columns as its header.
pub fn filter_trips(
    input: &Path,
    output: &Path,
    selection: &[String],
    value_filters: &[ValueFilter],
) -> Result<FilterSummary> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let mut reader = ReaderBuilder::new().from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    check_mandatory(&headers)?;

    // selection -> positions in the raw record
    let mut indices = Vec::with_capacity(selection.len());
    for column in selection {
        let Some(idx) = headers.iter().position(|h| h == column) else {
            bail!("attribute '{column}' not found in data");
        };
        indices.push(idx);
    }

    let mut filter_indices = Vec::with_capacity(value_filters.len());
    for filter in value_filters {
        let Some(idx) = headers.iter().position(|h| h == &filter.column) else {
            bail!("attribute '{}' not found in data", filter.column);
        };
        filter_indices.push((idx, filter));
    }

    let out_file =
        File::create(output).with_context(|| format!("creating {}", output.display()))?;
    let mut writer = WriterBuilder::new().from_writer(out_file);
    writer.write_record(selection)?;

    let mut summary = FilterSummary::default();

    for record in reader.records() {
        let record = record?;
        summary.rows_read += 1;

        let excluded = filter_indices.iter().any(|(idx, filter)| {
            let value = record.get(*idx).unwrap_or("");
            !filter.keep.iter().any(|k| k == value)
        });
        if excluded {
            summary.rows_dropped += 1;
            continue;
        }

        let cells: Vec<&str> = indices
            .iter()
            .map(|idx| record.get(*idx).unwrap_or(""))
            .collect();
        if cells.iter().any(|c| c.is_empty()) {
            summary.rows_dropped += 1;
            continue;
        }

        writer.write_record(&cells)?;
        summary.rows_written += 1;
    }

    writer.flush()?;
    debug!(
        input = %input.display(),
        output = %output.display(),
        "Filter pass complete"
    );
    info!(
        rows_read = summary.rows_read,
        rows_written = summary.rows_written,
        rows_dropped = summary.rows_dropped,
        "Cleaned trip export written"
    );

    Ok(summary)
}
