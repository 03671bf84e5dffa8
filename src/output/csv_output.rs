//! CSV table output
//!
//! The header row is always written from the fixed field list, so a run that
//! gathered no records still produces a valid file with headers and zero rows.

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::{PropertyRecord, FIELD_NAMES};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Writes records as CSV with one header row
///
/// Absent coordinates are written as empty cells; absent text fields as `N/A`.
pub fn write_csv<W: Write>(records: &[PropertyRecord], writer: W) -> OutputResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(FIELD_NAMES)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Reads records back from CSV produced by [`write_csv`]
pub fn read_csv<R: Read>(reader: R) -> OutputResult<Vec<PropertyRecord>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut records = Vec::new();

    for row in reader.deserialize() {
        records.push(row?);
    }

    Ok(records)
}

/// [`RecordSink`] that writes a CSV file
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSink for CsvFileSink {
    fn format_name(&self) -> &'static str {
        "csv"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write_records(&self, records: &[PropertyRecord]) -> OutputResult<()> {
        let file = File::create(&self.path)?;
        write_csv(records, file)
    }
}
