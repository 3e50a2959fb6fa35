//! Canonical travel records and the aggregation result
//!
//! Provider payloads are not schema-controlled by this system; whatever
//! survives extraction and sanitation is normalized into one of the record
//! variants below. Each category keeps its own result slot so concurrent
//! provider fetches never share mutable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Travel data categories served by the provider fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelCategory {
    Hotel,
    Bus,
    Train,
    Car,
    Activity,
    Guide,
}

impl TravelCategory {
    /// All categories in fixed slot order
    pub const ALL: [TravelCategory; 6] = [
        TravelCategory::Hotel,
        TravelCategory::Bus,
        TravelCategory::Train,
        TravelCategory::Car,
        TravelCategory::Activity,
        TravelCategory::Guide,
    ];

    /// Plural label, used for payload keys, error messages and log lines
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            TravelCategory::Hotel => "hotels",
            TravelCategory::Bus => "buses",
            TravelCategory::Train => "trains",
            TravelCategory::Car => "cars",
            TravelCategory::Activity => "activities",
            TravelCategory::Guide => "guides",
        }
    }
}

/// A hotel offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A bus connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusRecord {
    /// Operator or route name
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A train connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A rental car offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarRecord {
    /// Car type or model
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A bookable activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A local guide listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The normalized, sanitized representation of a provider item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum CanonicalRecord {
    Hotel(HotelRecord),
    Bus(BusRecord),
    Train(TrainRecord),
    Car(CarRecord),
    Activity(ActivityRecord),
    Guide(GuideRecord),
}

impl CanonicalRecord {
    /// Category of this record
    #[must_use]
    pub fn category(&self) -> TravelCategory {
        match self {
            CanonicalRecord::Hotel(_) => TravelCategory::Hotel,
            CanonicalRecord::Bus(_) => TravelCategory::Bus,
            CanonicalRecord::Train(_) => TravelCategory::Train,
            CanonicalRecord::Car(_) => TravelCategory::Car,
            CanonicalRecord::Activity(_) => TravelCategory::Activity,
            CanonicalRecord::Guide(_) => TravelCategory::Guide,
        }
    }

    /// Display name of this record
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            CanonicalRecord::Hotel(r) => &r.name,
            CanonicalRecord::Bus(r) => &r.name,
            CanonicalRecord::Train(r) => &r.name,
            CanonicalRecord::Car(r) => &r.name,
            CanonicalRecord::Activity(r) => &r.name,
            CanonicalRecord::Guide(r) => &r.name,
        }
    }

    /// Booking/detail URL, if the provider supplied a valid one
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            CanonicalRecord::Hotel(r) => r.url.as_deref(),
            CanonicalRecord::Bus(r) => r.url.as_deref(),
            CanonicalRecord::Train(r) => r.url.as_deref(),
            CanonicalRecord::Car(r) => r.url.as_deref(),
            CanonicalRecord::Activity(r) => r.url.as_deref(),
            CanonicalRecord::Guide(r) => r.url.as_deref(),
        }
    }

    /// Category-specific composite key used to detect duplicates.
    ///
    /// First occurrence wins; comparison is case-insensitive on the parts.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        let key = match self {
            CanonicalRecord::Hotel(r) => {
                format!("{}|{}", r.name, r.location.as_deref().unwrap_or(""))
            }
            CanonicalRecord::Bus(r) => format!(
                "{}|{}|{}",
                r.name,
                r.departure.as_deref().unwrap_or(""),
                r.arrival.as_deref().unwrap_or("")
            ),
            CanonicalRecord::Train(r) => format!(
                "{}|{}|{}",
                r.train_number.as_deref().unwrap_or(&r.name),
                r.departure.as_deref().unwrap_or(""),
                r.arrival.as_deref().unwrap_or("")
            ),
            CanonicalRecord::Car(r) => {
                format!("{}|{}", r.name, r.price.as_deref().unwrap_or(""))
            }
            CanonicalRecord::Activity(r) => {
                format!("{}|{}", r.name, r.location.as_deref().unwrap_or(""))
            }
            CanonicalRecord::Guide(r) => {
                format!("{}|{}", r.name, r.location.as_deref().unwrap_or(""))
            }
        };
        key.to_lowercase()
    }

    /// Clone this record as padding entry number `n`, carrying a
    /// distinguishing suffix on the name and a fragment on the url so padded
    /// entries are tellable apart from real ones.
    #[must_use]
    pub fn padded_clone(&self, n: usize) -> Self {
        let mut clone = self.clone();
        let (name, url) = clone.fields_mut();
        *name = format!("{name} (Option {n})");
        if let Some(u) = url {
            *u = format!("{u}#alt-{n}");
        }
        clone
    }

    fn fields_mut(&mut self) -> (&mut String, Option<&mut String>) {
        match self {
            CanonicalRecord::Hotel(r) => (&mut r.name, r.url.as_mut()),
            CanonicalRecord::Bus(r) => (&mut r.name, r.url.as_mut()),
            CanonicalRecord::Train(r) => (&mut r.name, r.url.as_mut()),
            CanonicalRecord::Car(r) => (&mut r.name, r.url.as_mut()),
            CanonicalRecord::Activity(r) => (&mut r.name, r.url.as_mut()),
            CanonicalRecord::Guide(r) => (&mut r.name, r.url.as_mut()),
        }
    }
}

/// One array per category, the per-category error messages, and the fetch
/// timestamp. Built once per request and discarded after the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub hotels: Vec<CanonicalRecord>,
    pub buses: Vec<CanonicalRecord>,
    pub trains: Vec<CanonicalRecord>,
    pub cars: Vec<CanonicalRecord>,
    pub activities: Vec<CanonicalRecord>,
    pub guides: Vec<CanonicalRecord>,
    /// Human-readable message per failed provider category
    pub errors: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

impl AggregationResult {
    /// Create an empty result stamped with the current time
    #[must_use]
    pub fn new() -> Self {
        Self {
            hotels: Vec::new(),
            buses: Vec::new(),
            trains: Vec::new(),
            cars: Vec::new(),
            activities: Vec::new(),
            guides: Vec::new(),
            errors: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    /// The result slot for a category
    #[must_use]
    pub fn records_for(&self, category: TravelCategory) -> &[CanonicalRecord] {
        match category {
            TravelCategory::Hotel => &self.hotels,
            TravelCategory::Bus => &self.buses,
            TravelCategory::Train => &self.trains,
            TravelCategory::Car => &self.cars,
            TravelCategory::Activity => &self.activities,
            TravelCategory::Guide => &self.guides,
        }
    }

    /// Mutable result slot for a category
    pub fn slot_mut(&mut self, category: TravelCategory) -> &mut Vec<CanonicalRecord> {
        match category {
            TravelCategory::Hotel => &mut self.hotels,
            TravelCategory::Bus => &mut self.buses,
            TravelCategory::Train => &mut self.trains,
            TravelCategory::Car => &mut self.cars,
            TravelCategory::Activity => &mut self.activities,
            TravelCategory::Guide => &mut self.guides,
        }
    }

    /// Total number of canonical records across all categories
    #[must_use]
    pub fn total_records(&self) -> usize {
        TravelCategory::ALL
            .iter()
            .map(|c| self.records_for(*c).len())
            .sum()
    }
}

impl Default for AggregationResult {
    fn default() -> Self {
        Self::new()
    }
}
