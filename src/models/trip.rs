//! Trip request models
//!
//! The raw request arrives from a JavaScript frontend, so the wire format is
//! camelCase and almost every field is optional. `ResolvedTrip` is the
//! normalized form produced by the requirement resolver once the request has
//! been judged complete enough to act on.

use serde::{Deserialize, Serialize};

/// A partially-specified trip request as submitted by the caller.
///
/// Immutable input to the orchestrator; consumed once, never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripRequest {
    /// Departure city or region
    pub origin: Option<String>,
    /// Destination city or region
    pub destination: Option<String>,
    /// Trip length in days
    pub duration_days: Option<u32>,
    /// Total budget in USD
    pub budget_usd: Option<f64>,
    /// Number of travelers
    pub party_size: Option<u32>,
    /// Ordered interests (e.g. "hiking", "food")
    pub interests: Vec<String>,
    /// Free-form travel dates (e.g. "mid October")
    pub travel_dates: Option<String>,
    /// Hotel check-in date
    pub check_in_date: Option<String>,
    /// Hotel check-out date
    pub check_out_date: Option<String>,
    /// Proceed with defaults instead of asking clarifying questions
    pub force_proceed: bool,
    /// The user's original natural-language query, if any
    pub user_query: Option<String>,
}

impl TripRequest {
    /// Whether the destination field carries usable content
    #[must_use]
    pub fn has_destination(&self) -> bool {
        self.destination
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }

    /// Whether the duration field carries usable content
    #[must_use]
    pub fn has_duration(&self) -> bool {
        self.duration_days.is_some_and(|d| d > 0)
    }
}

/// A trip request after requirement resolution: required fields are filled
/// (possibly with defaults), interests are de-duplicated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTrip {
    pub destination: String,
    pub duration_days: u32,
    pub origin: Option<String>,
    pub budget_usd: Option<f64>,
    pub party_size: Option<u32>,
    pub interests: Vec<String>,
    pub travel_dates: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub user_query: Option<String>,
}

impl ResolvedTrip {
    /// Short human-readable label used in logs and summarization context
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} for {} days", self.destination, self.duration_days)
    }
}
