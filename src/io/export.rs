//! CSV/JSON export for finished simulation runs.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::SimError;
use crate::runner::SimulationOutput;
use crate::sim::event::EventRecord;
use crate::sim::kpi::RunSummary;
use crate::sim::types::TimestepRecord;

pub const TIMESTEPS_FILE: &str = "timesteps.csv";
pub const EVENTS_FILE: &str = "events.csv";
pub const SUMMARY_FILE: &str = "summary.json";

fn write_records<T: Serialize>(rows: &[T], writer: impl Write) -> Result<(), SimError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the timestep log as CSV, one row per step, in log order.
///
/// Column names are the `TimestepRecord` field names. Produces identical
/// bytes for identical logs.
///
/// # Errors
///
/// Returns `SimError::Csv` or `SimError::Io` if writing fails.
pub fn write_timesteps_csv(records: &[TimestepRecord], writer: impl Write) -> Result<(), SimError> {
    write_records(records, writer)
}

/// Writes the event log as CSV with columns `time_min,hour,event_type,description`.
///
/// # Errors
///
/// Returns `SimError::Csv` or `SimError::Io` if writing fails.
pub fn write_events_csv(events: &[EventRecord], writer: impl Write) -> Result<(), SimError> {
    write_records(events, writer)
}

/// Writes the run summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns `SimError::Json` if serialization or writing fails.
pub fn write_summary_json(summary: &RunSummary, mut writer: impl Write) -> Result<(), SimError> {
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Writes `timesteps.csv`, `events.csv`, and `summary.json` into `dir`.
///
/// The directory is created if missing; existing files are overwritten.
///
/// # Errors
///
/// Returns a `SimError` if the directory or any file cannot be written.
pub fn export_run(dir: &Path, output: &SimulationOutput) -> Result<(), SimError> {
    fs::create_dir_all(dir)?;

    let file = File::create(dir.join(TIMESTEPS_FILE))?;
    write_timesteps_csv(&output.timesteps, io::BufWriter::new(file))?;

    let file = File::create(dir.join(EVENTS_FILE))?;
    write_events_csv(&output.events, io::BufWriter::new(file))?;

    let file = File::create(dir.join(SUMMARY_FILE))?;
    let mut buf = io::BufWriter::new(file);
    write_summary_json(&output.summary, &mut buf)?;
    buf.flush()?;
    Ok(())
}
