//! CSV export for per-tick grid telemetry.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::TickResult;

/// Column header for CSV telemetry export.
const HEADER: &str = "tick,sources,transfers,energy_moved,overvolted_sinks,\
                       placement_checks,placement_incidents,cells_destroyed,\
                       invalidated,cache_hits,cache_misses,truncated_scans";

/// Exports tick results to a CSV file at the given path.
///
/// Writes a header row followed by one data row per tick. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `results` - Tick records of an engine run
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &[TickResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes tick results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &[TickResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in results {
        wtr.write_record(&[
            r.tick.to_string(),
            r.sources.to_string(),
            r.transfers.to_string(),
            r.energy_moved.to_string(),
            r.overvolted_sinks.to_string(),
            r.placement_checks.to_string(),
            r.placement_incidents.to_string(),
            r.cells_destroyed.to_string(),
            r.invalidated.to_string(),
            r.cache_hits.to_string(),
            r.cache_misses.to_string(),
            r.truncated_scans.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
