//! Event-log export.
//!
//! Writes the raw event log as CSV (one row per record, spreadsheet/pandas
//! friendly) or JSON (array of records keyed by column name). Long-horizon
//! logs are written through a buffered writer in one pass rather than
//! materialized as a single string.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fabsim_components::EventRecord;

use crate::error::MetricsError;

const CSV_HEADER: &str = "Time,Resource,State,State Type,Activity,Product,\
Expected End Time,Origin location,Target location,Empty Transport";

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_csv_to(out: &mut impl Write, records: &[EventRecord]) -> Result<(), MetricsError> {
    writeln!(out, "{CSV_HEADER}")?;
    for r in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{}",
            r.time,
            csv_field(&r.resource),
            csv_field(&r.state),
            r.state_type.as_str(),
            r.activity.as_str(),
            r.product.as_deref().map(csv_field).unwrap_or_default(),
            r.expected_end_time.map(|t| t.to_string()).unwrap_or_default(),
            r.origin_location.as_deref().map(csv_field).unwrap_or_default(),
            r.target_location.as_deref().map(csv_field).unwrap_or_default(),
            r.empty_transport.map(|b| b.to_string()).unwrap_or_default(),
        )?;
    }
    Ok(())
}

/// Write the event log as a CSV file.
pub fn write_csv(path: impl AsRef<Path>, records: &[EventRecord]) -> Result<(), MetricsError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_csv_to(&mut out, records)?;
    out.flush()?;
    Ok(())
}

/// Write the event log as a JSON array of records.
pub fn write_json(path: impl AsRef<Path>, records: &[EventRecord]) -> Result<(), MetricsError> {
    let out = BufWriter::new(File::create(path)?);
    serde_json::to_writer(out, records)?;
    Ok(())
}
