//! Property record definitions
//!
//! A `PropertyRecord` is built in one step by the extractor and never mutated
//! afterwards. Text fields that the page did not carry hold
//! [`FieldValue::Unavailable`], which serializes as the `"N/A"` sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel text written for a field the page did not provide
pub const UNAVAILABLE: &str = "N/A";

/// Column order shared by the JSON objects and the CSV header
pub const FIELD_NAMES: [&str; 13] = [
    "home_id",
    "price",
    "type",
    "location",
    "location_precise",
    "baths",
    "area",
    "purpose",
    "beds",
    "creation_date",
    "latitude",
    "longitude",
    "description",
];

/// A scraped text field, or the explicit marker that it was absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldValue {
    Present(String),
    Unavailable,
}

impl FieldValue {
    /// Wraps an optional value, mapping `None` to the sentinel
    pub fn from_option(value: Option<String>) -> Self {
        value.map_or(Self::Unavailable, Self::Present)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Present(text) => text,
            Self::Unavailable => UNAVAILABLE,
        }
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        if text == UNAVAILABLE {
            Self::Unavailable
        } else {
            Self::Present(text)
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::from(text.to_string())
    }
}

impl From<FieldValue> for String {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Present(text) => text,
            FieldValue::Unavailable => UNAVAILABLE.to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scraped property listing
///
/// Field order matches [`FIELD_NAMES`]; the CSV writer relies on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub home_id: u64,
    pub price: FieldValue,
    #[serde(rename = "type")]
    pub property_type: FieldValue,
    pub location: FieldValue,
    pub location_precise: FieldValue,
    pub baths: FieldValue,
    pub area: FieldValue,
    pub purpose: FieldValue,
    pub beds: FieldValue,
    pub creation_date: FieldValue,
    /// Present only when the embedded analytics block carried it
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: FieldValue,
}

impl PropertyRecord {
    /// Returns the text fields paired with their column names
    pub fn text_fields(&self) -> [(&'static str, &FieldValue); 10] {
        [
            ("price", &self.price),
            ("type", &self.property_type),
            ("location", &self.location),
            ("location_precise", &self.location_precise),
            ("baths", &self.baths),
            ("area", &self.area),
            ("purpose", &self.purpose),
            ("beds", &self.beds),
            ("creation_date", &self.creation_date),
            ("description", &self.description),
        ]
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}
