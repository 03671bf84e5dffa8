//! JSON array output

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::PropertyRecord;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Indentation of the JSON output
const INDENT: &[u8] = b"    ";

/// Writes records as a JSON array indented by four spaces
///
/// Non-ASCII text (Urdu place names, currency symbols) is written as UTF-8,
/// not escaped.
pub fn write_json<W: Write>(records: &[PropertyRecord], writer: W) -> OutputResult<()> {
    let mut writer = writer;
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = Serializer::with_formatter(&mut writer, formatter);
    records.serialize(&mut serializer)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads a JSON array of records
pub fn read_json<R: Read>(reader: R) -> OutputResult<Vec<PropertyRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Reads a JSON array of records from a file
pub fn read_json_file(path: &Path) -> OutputResult<Vec<PropertyRecord>> {
    read_json(BufReader::new(File::open(path)?))
}

/// [`RecordSink`] that writes a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSink for JsonFileSink {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write_records(&self, records: &[PropertyRecord]) -> OutputResult<()> {
        let file = File::create(&self.path)?;
        write_json(records, BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn record(home_id: u64) -> PropertyRecord {
        PropertyRecord {
            home_id,
            price: "PKR 95 Lakh".into(),
            property_type: "Flat".into(),
            location: "Bahria Town, Lahore, Punjab".into(),
            location_precise: "Sector C, Bahria Town".into(),
            baths: "2".into(),
            area: "5 Marla".into(),
            purpose: "For Sale".into(),
            beds: FieldValue::Unavailable,
            creation_date: "1 day ago".into(),
            latitude: Some(31.3676),
            longitude: Some(74.1853),
            description: "ماڈل ٹاؤن کے قریب".into(),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let records = vec![record(0), record(1)];
        let mut buffer = Vec::new();
        write_json(&records, &mut buffer).unwrap();

        let restored = read_json(buffer.as_slice()).unwrap();
        assert_eq!(restored, records);
    }

    #[test]
    fn test_json_is_indented_utf8() {
        let mut buffer = Vec::new();
        write_json(&[record(0)], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("[\n"));
        assert!(text.contains("\n        \"home_id\": 0"));
        assert!(text.contains("ماڈل ٹاؤن"));
        assert!(text.contains("\"beds\": \"N/A\""));
    }

    #[test]
    fn test_empty_array() {
        let mut buffer = Vec::new();
        write_json(&[], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap().trim(), "[]");
    }

    #[test]
    fn test_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("properties.json"));
        sink.write_records(&[record(4)]).unwrap();

        let restored = read_json_file(sink.path()).unwrap();
        assert_eq!(restored, vec![record(4)]);
        assert_eq!(sink.format_name(), "json");
    }
}
