//! Property record extraction from detail pages
//!
//! Detail pages label each fact with an `aria-label` attribute, e.g.
//! `<span aria-label="Price">PKR 2.1 Crore</span>`. A missing label is not an
//! error: that one field becomes the `N/A` sentinel and the rest of the record
//! is unaffected.
//!
//! Coordinates are not shown on the page. They come from the analytics
//! bootstrap script, which pushes a JSON object onto `window['dataLayer']`:
//!
//! ```text
//! window['dataLayer'] = window['dataLayer'] || [];
//! window['dataLayer'].push({"latitude": 31.47, "longitude": 74.41, ...});
//! ```

use crate::crawler::discover::parse_selector;
use crate::record::{FieldValue, PropertyRecord};
use crate::state::HomeIdCounter;
use crate::HarvestError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Marker that identifies the analytics bootstrap script
const DATA_LAYER_MARKER: &str = "window['dataLayer']";

/// Full assignment-and-push statement; group 1 is the pushed JSON object
const DATA_LAYER_PATTERN: &str = r"window\['dataLayer'\]\s*=\s*window\['dataLayer'\]\s*\|\|\s*\[\];\s*window\['dataLayer'\]\.push\((\{.*\})\);";

/// What became of the coordinate lookup for one page
#[derive(Debug, Clone, PartialEq)]
pub enum GeoStatus {
    /// Both coordinates were recovered
    Found,

    /// The page has no analytics bootstrap script
    Missing,

    /// The block parsed but lacked one or both coordinates
    Incomplete,

    /// The marker was present but the block could not be matched or decoded
    Malformed(String),
}

impl GeoStatus {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

/// A freshly extracted record and how its coordinates were resolved
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: PropertyRecord,
    pub geo: GeoStatus,
}

/// Labelled element selectors, compiled once and shared by all workers
#[derive(Debug)]
pub struct RecordExtractor {
    price: Selector,
    property_type: Selector,
    location: Selector,
    location_precise: Selector,
    baths: Selector,
    area: Selector,
    purpose: Selector,
    beds: Selector,
    creation_date: Selector,
    description: Selector,
    scripts: Selector,
    data_layer: Regex,
}

impl RecordExtractor {
    pub fn new() -> Result<Self, HarvestError> {
        Ok(Self {
            price: labelled("span", "Price")?,
            property_type: labelled("span", "Type")?,
            location: labelled("span", "Location")?,
            location_precise: labelled("div", "Property header")?,
            baths: labelled("span", "Baths")?,
            area: labelled("span", "Area")?,
            purpose: labelled("span", "Purpose")?,
            beds: labelled("span", "Beds")?,
            creation_date: labelled("span", "Creation date")?,
            description: labelled("div", "Property description")?,
            scripts: parse_selector("script")?,
            data_layer: Regex::new(DATA_LAYER_PATTERN)?,
        })
    }

    /// Extracts one record from a parsed detail page
    ///
    /// The `home_id` is taken from `ids` only after every field has been
    /// read, so the record is complete the moment it exists.
    pub fn extract(&self, document: &Html, ids: &HomeIdCounter) -> Extraction {
        let price = self.field(document, &self.price);
        let property_type = self.field(document, &self.property_type);
        let location = self.field(document, &self.location);
        let location_precise = self.field(document, &self.location_precise);
        let baths = self.field(document, &self.baths);
        let area = self.field(document, &self.area);
        let purpose = self.field(document, &self.purpose);
        let beds = self.field(document, &self.beds);
        let creation_date = self.field(document, &self.creation_date);
        let description = self.field(document, &self.description);
        let (coordinates, geo) = self.coordinates(document);

        let record = PropertyRecord {
            home_id: ids.next_id(),
            price,
            property_type,
            location,
            location_precise,
            baths,
            area,
            purpose,
            beds,
            creation_date,
            latitude: coordinates.0,
            longitude: coordinates.1,
            description,
        };

        Extraction { record, geo }
    }

    /// Convenience wrapper that parses raw HTML first
    pub fn extract_from_html(&self, html: &str, ids: &HomeIdCounter) -> Extraction {
        self.extract(&Html::parse_document(html), ids)
    }

    fn field(&self, document: &Html, selector: &Selector) -> FieldValue {
        FieldValue::from_option(document.select(selector).next().map(stripped_text))
    }

    fn coordinates(&self, document: &Html) -> ((Option<f64>, Option<f64>), GeoStatus) {
        let Some(script) = document
            .select(&self.scripts)
            .map(|element| element.text().collect::<String>())
            .find(|text| text.contains(DATA_LAYER_MARKER))
        else {
            return ((None, None), GeoStatus::Missing);
        };

        let Some(captures) = self.data_layer.captures(&script) else {
            return (
                (None, None),
                GeoStatus::Malformed("dataLayer push statement not found".to_string()),
            );
        };

        let data: Value = match serde_json::from_str(&captures[1]) {
            Ok(data) => data,
            Err(e) => return ((None, None), GeoStatus::Malformed(e.to_string())),
        };

        let latitude = coordinate(&data, "latitude");
        let longitude = coordinate(&data, "longitude");
        let status = if latitude.is_some() && longitude.is_some() {
            GeoStatus::Found
        } else {
            GeoStatus::Incomplete
        };

        ((latitude, longitude), status)
    }
}

fn labelled(tag: &str, label: &str) -> Result<Selector, HarvestError> {
    parse_selector(&format!(r#"{}[aria-label="{}"]"#, tag, label))
}

/// Concatenates the element's text nodes, each trimmed, empty ones dropped
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Reads a coordinate given as a number or numeric string
///
/// Zero, empty, and non-numeric values count as absent.
fn coordinate(data: &Value, key: &str) -> Option<f64> {
    let value = match data.get(key)? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    (value != 0.0 && value.is_finite()).then_some(value)
}
