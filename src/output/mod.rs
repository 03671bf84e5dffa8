//! Output module for persisting the record set and reporting on a run
//!
//! This module handles:
//! - Writing the final record collection as a JSON array and a CSV table
//! - Structured failure reports for pages that contributed nothing
//! - Recording crawl statistics and field coverage

mod csv_output;
mod json;
pub mod stats;
mod traits;

pub use csv_output::{read_csv, write_csv, CsvFileSink};
pub use json::{read_json, read_json_file, write_json, JsonFileSink};
pub use stats::{
    field_coverage, format_elapsed, print_coverage, print_statistics, CrawlStatistics,
    FieldCoverage,
};
pub use traits::{
    FailureKind, FailureReport, FailureStage, OutputError, OutputResult, RecordSink,
};

use crate::config::OutputConfig;
use crate::record::PropertyRecord;
use std::path::PathBuf;

/// Writes the finalized record set to every configured sink
///
/// Both files hold the same records in the same order.
///
/// # Arguments
///
/// * `records` - The complete record collection, already ordered
/// * `config` - Output paths
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths written, JSON first
/// * `Err(OutputError)` - A file could not be written
pub fn write_outputs(
    records: &[PropertyRecord],
    config: &OutputConfig,
) -> OutputResult<Vec<PathBuf>> {
    let sinks: Vec<Box<dyn RecordSink>> = vec![
        Box::new(JsonFileSink::new(&config.json_path)),
        Box::new(CsvFileSink::new(&config.csv_path)),
    ];

    let mut written = Vec::with_capacity(sinks.len());
    for sink in sinks {
        sink.write_records(records)
            .map_err(|e| OutputError::Write {
                path: sink.path().display().to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(
            "Wrote {} records to {} ({})",
            records.len(),
            sink.path().display(),
            sink.format_name()
        );
        written.push(sink.path().to_path_buf());
    }

    Ok(written)
}
