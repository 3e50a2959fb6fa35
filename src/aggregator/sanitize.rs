//! Sanitation, deduplication and padding of extracted provider items
//!
//! Raw items regularly carry artifacts of sloppy upstream serialization:
//! escaped control sequences, wrapping quotes, and fragments of JSON that
//! leaked into text fields. Items whose name looks like such an artifact are
//! rejected outright (the garbage heuristic); everything else is cleaned
//! field by field, de-duplicated by a category-specific composite key, and
//! padded up to the configured minimum display count.

use crate::models::records::{
    ActivityRecord, BusRecord, CanonicalRecord, CarRecord, GuideRecord, HotelRecord, TrainRecord,
};
use crate::models::TravelCategory;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Trailing `", key:` residue left when a JSON fragment leaks into a string
static TRAILING_RESIDUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\s*,\s*"?[A-Za-z0-9_]+"?\s*:.*$"#).unwrap());

/// Clean a free-text field from a provider payload.
///
/// Strips escaped control sequences and raw control characters, truncates at
/// the first leaked JSON fragment, removes wrapping quotes and collapses
/// repeated whitespace.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    let mut text = raw
        .replace("\\n", " ")
        .replace("\\r", " ")
        .replace("\\t", " ");
    text = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    // a literal "," sequence means everything after it belongs to the
    // serialized neighbor, not to this field
    if let Some(idx) = text.find("\",\"") {
        text.truncate(idx);
    }
    let text = TRAILING_RESIDUE.replace(&text, "");

    let text = text.trim().trim_matches(['"', '\'']);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Garbage heuristic: does this raw name look like a parsing artifact
/// rather than real content?
#[must_use]
pub fn is_garbage(raw_name: &str) -> bool {
    let trimmed = raw_name.trim();
    trimmed.chars().count() < 2
        || trimmed.contains(['{', '}', '[', ']'])
        || trimmed.contains("\":")
}

/// Clamp a raw rating value into [0, 5]; non-numeric and non-finite values
/// are discarded.
#[must_use]
pub fn clamp_rating(value: &Value) -> Option<f64> {
    let rating = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !rating.is_finite() {
        return None;
    }
    Some(rating.clamp(0.0, 5.0))
}

/// Keep a URL only when it carries an http/https scheme
#[must_use]
pub fn sanitize_url(value: &Value) -> Option<String> {
    let url = value.as_str()?.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url.to_string())
    } else {
        None
    }
}

fn sanitize_price(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let cleaned = clean_text(s);
            (!cleaned.is_empty()).then_some(cleaned)
        }
        Value::Number(n) => n.as_f64().map(|v| format!("${v}")),
        _ => None,
    }
}

fn raw_text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| item.get(*key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn text_field(item: &Value, keys: &[&str]) -> Option<String> {
    let cleaned = clean_text(&raw_text(item, keys)?);
    (!cleaned.is_empty()).then_some(cleaned)
}

fn first_value<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| item.get(*key))
}

fn rating_field(item: &Value) -> Option<f64> {
    first_value(item, &["rating", "stars", "score"]).and_then(clamp_rating)
}

fn price_field(item: &Value) -> Option<String> {
    first_value(
        item,
        &["price", "cost", "fare", "rate", "pricePerNight", "pricePerDay"],
    )
    .and_then(sanitize_price)
}

fn url_field(item: &Value) -> Option<String> {
    first_value(item, &["url", "link", "bookingUrl", "website"]).and_then(sanitize_url)
}

fn count_field(item: &Value, keys: &[&str]) -> Option<u32> {
    let value = first_value(item, keys)?;
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn languages_field(item: &Value) -> Option<String> {
    match first_value(item, &["languages", "language"])? {
        Value::String(s) => {
            let cleaned = clean_text(s);
            (!cleaned.is_empty()).then_some(cleaned)
        }
        Value::Array(values) => {
            let joined = values
                .iter()
                .filter_map(Value::as_str)
                .map(clean_text)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}

/// Name/title of the raw item; the garbage check runs against the raw value
/// so leaked JSON residue is still visible to it.
fn sanitized_name(item: &Value, keys: &[&str]) -> Option<String> {
    let raw = raw_text(item, keys)?;
    if is_garbage(&raw) {
        return None;
    }
    let cleaned = clean_text(&raw);
    if cleaned.chars().count() < 2 {
        return None;
    }
    Some(cleaned)
}

/// Normalize one raw item into a canonical record, or reject it
#[must_use]
pub fn build_record(item: &Value, category: TravelCategory) -> Option<CanonicalRecord> {
    let record = match category {
        TravelCategory::Hotel => CanonicalRecord::Hotel(HotelRecord {
            name: sanitized_name(item, &["name", "title", "hotelName"])?,
            price: price_field(item),
            rating: rating_field(item),
            location: text_field(item, &["location", "address", "city", "area"]),
            url: url_field(item),
        }),
        TravelCategory::Bus => CanonicalRecord::Bus(BusRecord {
            name: sanitized_name(item, &["operator", "name", "title"])?,
            price: price_field(item),
            rating: rating_field(item),
            departure: text_field(item, &["departure", "departureTime"]),
            arrival: text_field(item, &["arrival", "arrivalTime"]),
            seats: count_field(item, &["seats", "seatsAvailable", "availableSeats"]),
            url: url_field(item),
        }),
        TravelCategory::Train => CanonicalRecord::Train(TrainRecord {
            name: sanitized_name(item, &["name", "operator", "title"])?,
            train_number: text_field(item, &["trainNumber", "number", "trainNo"]),
            price: price_field(item),
            rating: rating_field(item),
            departure: text_field(item, &["departure", "departureTime"]),
            arrival: text_field(item, &["arrival", "arrivalTime"]),
            seats: count_field(item, &["seats", "seatsAvailable", "availableSeats"]),
            url: url_field(item),
        }),
        TravelCategory::Car => CanonicalRecord::Car(CarRecord {
            name: sanitized_name(item, &["carType", "name", "model", "title"])?,
            price: price_field(item),
            rating: rating_field(item),
            capacity: count_field(item, &["capacity", "seats", "passengers"]),
            url: url_field(item),
        }),
        TravelCategory::Activity => CanonicalRecord::Activity(ActivityRecord {
            name: sanitized_name(item, &["title", "name"])?,
            price: price_field(item),
            rating: rating_field(item),
            duration: text_field(item, &["duration", "length"]),
            location: text_field(item, &["location", "address", "meetingPoint"]),
            url: url_field(item),
        }),
        TravelCategory::Guide => CanonicalRecord::Guide(GuideRecord {
            name: sanitized_name(item, &["name", "guideName", "title"])?,
            price: price_field(item),
            rating: rating_field(item),
            languages: languages_field(item),
            location: text_field(item, &["location", "city", "area"]),
            url: url_field(item),
        }),
    };
    Some(record)
}

/// Clean, deduplicate and pad a category's raw items.
///
/// Surviving items keep their original order; duplicates by composite key
/// collapse to the first occurrence. A slot with at least one real record is
/// padded up to `min_results` by cloning marked copies of existing entries;
/// an empty slot stays empty.
#[must_use]
pub fn sanitize_records(
    raw: &[Value],
    category: TravelCategory,
    min_results: usize,
) -> Vec<CanonicalRecord> {
    let mut seen = HashSet::new();
    let mut records: Vec<CanonicalRecord> = raw
        .iter()
        .filter_map(|item| build_record(item, category))
        .filter(|record| seen.insert(record.dedup_key()))
        .collect();

    let rejected = raw.len() - records.len();
    if rejected > 0 {
        tracing::debug!(
            "Dropped {} of {} raw {} (garbage or duplicate)",
            rejected,
            raw.len(),
            category.plural()
        );
    }

    pad_records(&mut records, min_results);
    records
}

/// Padding is deliberate product behavior: sparse-but-nonempty categories
/// are topped up with marked clones of real entries so the display never
/// shows a nearly empty shelf. Records are never fabricated from nothing.
fn pad_records(records: &mut Vec<CanonicalRecord>, min_results: usize) {
    if records.is_empty() || records.len() >= min_results {
        return;
    }
    let real_count = records.len();
    let mut source = 0;
    while records.len() < min_results {
        let clone = records[source % real_count].padded_clone(records.len() + 1);
        records.push(clone);
        source += 1;
    }
}
