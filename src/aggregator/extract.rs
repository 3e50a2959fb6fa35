//! Extraction strategies for arbitrarily shaped provider payloads
//!
//! Provider APIs are not schema-controlled by this system: the same category
//! may arrive as a bare array, under a generic envelope key, under a
//! category-specific key, or nested one level inside a `data` object. The
//! strategies below are tried in fixed priority order and the first one
//! producing a non-empty array wins. Lookup only — a shape nobody recognizes
//! yields an empty list, never an error.

use crate::models::TravelCategory;
use serde_json::Value;

/// A single way of locating the item array inside a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// The payload itself is the array
    Direct,
    /// The array sits under a named top-level key
    Key(&'static str),
    /// The array is the first non-empty array value one level under `data`
    NestedData,
}

impl Strategy {
    fn try_extract<'a>(self, payload: &'a Value) -> Option<&'a [Value]> {
        match self {
            Strategy::Direct => non_empty_array(payload),
            Strategy::Key(key) => payload.get(key).and_then(non_empty_array),
            Strategy::NestedData => payload
                .get("data")
                .and_then(Value::as_object)
                .and_then(|data| data.values().find_map(non_empty_array)),
        }
    }
}

fn non_empty_array(value: &Value) -> Option<&[Value]> {
    value.as_array().filter(|a| !a.is_empty()).map(Vec::as_slice)
}

/// Strategy priority for a category: direct array, generic envelope keys,
/// the category's own key, then one level of nesting under `data`.
fn strategies_for(category: TravelCategory) -> [Strategy; 6] {
    [
        Strategy::Direct,
        Strategy::Key("data"),
        Strategy::Key("results"),
        Strategy::Key("items"),
        Strategy::Key(category.plural()),
        Strategy::NestedData,
    ]
}

/// Pull the raw item array out of a provider payload.
///
/// Returns the first non-empty array found by the ordered strategies, or an
/// empty vector when no strategy matches.
#[must_use]
pub fn extract_items(payload: &Value, category: TravelCategory) -> Vec<Value> {
    for strategy in strategies_for(category) {
        if let Some(items) = strategy.try_extract(payload) {
            tracing::debug!(
                "Extracted {} raw {} via {:?}",
                items.len(),
                category.plural(),
                strategy
            );
            return items.to_vec();
        }
    }
    tracing::debug!("No recognizable item array in {} payload", category.plural());
    Vec::new()
}
