//! # Response Formatter
//!
//! Turns raw catalog payloads into [`Country`] values.
//!
//! The service has shipped several record layouts over time (the nested v3.1
//! form, the flatter v2 form, and hand-built fixtures), so every field is read
//! through a short list of accepted spellings. Only the three-letter code is
//! mandatory; anything else that is missing falls back to an empty value.

use std::collections::BTreeSet;
use std::fmt;

use log::debug;
use serde_json::{Map, Value};

use super::types::{Country, Region};

/// The endpoint a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `GET /all`
    Listing,
    /// `GET /region/{region}`; records may omit their own region.
    Region(Region),
    /// `GET /alpha?codes=`
    Borders,
    /// `GET /name/{query}`
    FullSearch,
}

impl Shape {
    pub fn label(self) -> &'static str {
        match self {
            Shape::Listing => "listing",
            Shape::Region(_) => "region",
            Shape::Borders => "borders",
            Shape::FullSearch => "fullsearch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The payload was not a JSON array.
    NotASequence { shape: Shape },
    /// Entry `index` had no usable country code.
    MissingCode { shape: Shape, index: usize },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::NotASequence { shape } => {
                write!(f, "{} payload is not a list", shape.label())
            }
            FormatError::MissingCode { shape, index } => {
                write!(f, "{} entry {index} has no country code", shape.label())
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Normalizes a payload into countries, preserving the service's order.
pub fn normalize(payload: &Value, shape: Shape) -> Result<Vec<Country>, FormatError> {
    let entries = payload
        .as_array()
        .ok_or(FormatError::NotASequence { shape })?;

    let countries = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let record = entry.as_object().ok_or(FormatError::MissingCode { shape, index })?;
            let mut country = extract(record).ok_or(FormatError::MissingCode { shape, index })?;
            if let Shape::Region(region) = shape
                && country.region.is_empty()
            {
                country.region = region.label().to_string();
            }
            Ok(country)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Normalized {} {} entries", countries.len(), shape.label());
    Ok(countries)
}

// ============================================================================
// Field extraction
// ============================================================================

fn extract(record: &Map<String, Value>) -> Option<Country> {
    let code = first_str(record, &["cca3", "alpha3Code", "code"])?;
    if code.is_empty() {
        return None;
    }

    Some(Country {
        code: code.to_string(),
        name: name(record),
        native_name: native_name(record),
        flag: flag(record),
        region: first_str(record, &["region"]).unwrap_or_default().to_string(),
        subregion: first_str(record, &["subregion"]).unwrap_or_default().to_string(),
        capital: capital(record),
        population: population(record),
        top_level_domains: string_list(record, &["tld", "topLevelDomain"]),
        languages: languages(record),
        currencies: currencies(record),
        borders: string_list(record, &["borders"]),
    })
}

fn first_str<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| record.get(*k).and_then(Value::as_str))
}

fn name(record: &Map<String, Value>) -> String {
    match record.get("name") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(obj)) => obj
            .get("common")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// v3.1 nests native names per language; the first language wins.
fn native_name(record: &Map<String, Value>) -> Option<String> {
    let nested = record
        .get("name")
        .and_then(|n| n.get("nativeName"))
        .and_then(Value::as_object)
        .and_then(|langs| langs.values().find_map(|v| v.get("common")?.as_str()));

    nested
        .or_else(|| first_str(record, &["nativeName"]))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn flag(record: &Map<String, Value>) -> String {
    let flags = record.get("flags");
    ["svg", "png"]
        .iter()
        .find_map(|k| flags.and_then(|f| f.get(*k)).and_then(Value::as_str))
        .or_else(|| first_str(record, &["flag"]))
        .unwrap_or_default()
        .to_string()
}

fn capital(record: &Map<String, Value>) -> Option<String> {
    match record.get("capital") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Array(items)) => items.iter().find_map(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn population(record: &Map<String, Value>) -> u64 {
    match record.get("population") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

fn string_list(record: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|k| record.get(*k).and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// `{"fra": "French"}` (v3.1), `[{"name": "French"}]` (v2), or `["French"]`.
fn languages(record: &Map<String, Value>) -> BTreeSet<String> {
    match record.get("languages") {
        Some(Value::Object(obj)) => obj
            .values()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().or_else(|| item.get("name")?.as_str()))
            .map(str::to_string)
            .collect(),
        _ => BTreeSet::new(),
    }
}

/// `{"EUR": {"name": "Euro"}}` (v3.1), `[{"code": "EUR", "name": "Euro"}]` (v2), or `["Euro"]`.
fn currencies(record: &Map<String, Value>) -> BTreeSet<String> {
    match record.get("currencies") {
        Some(Value::Object(obj)) => obj
            .iter()
            .map(|(code, detail)| {
                detail
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or(code.as_str())
                    .to_string()
            })
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                item.as_str()
                    .or_else(|| item.get("name")?.as_str())
                    .or_else(|| item.get("code")?.as_str())
            })
            .map(str::to_string)
            .collect(),
        _ => BTreeSet::new(),
    }
}
