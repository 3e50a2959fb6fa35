//! Provider aggregation module
//!
//! Fans out to the configured travel-data providers concurrently, bounds the
//! whole round with a shared deadline, and collects every outcome
//! independently (settle-all): one slow or failing provider never blocks,
//! cancels, or corrupts the results of the others. Raw payloads pass through
//! extraction and sanitation before landing in their category slot.

pub mod extract;
pub mod sanitize;

use crate::config::{ProviderEndpoint, ProvidersConfig};
use crate::error::TripFlowError;
use crate::models::{AggregationResult, CanonicalRecord, ResolvedTrip, TravelCategory};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Category-agnostic query parameters sent to every provider
#[derive(Debug, Clone)]
pub struct ProviderQuery {
    pub origin: Option<String>,
    pub destination: String,
    pub date: Option<String>,
    pub party_size: u32,
}

impl From<&ResolvedTrip> for ProviderQuery {
    fn from(trip: &ResolvedTrip) -> Self {
        Self {
            origin: trip.origin.clone(),
            destination: trip.destination.clone(),
            date: trip
                .check_in_date
                .clone()
                .or_else(|| trip.travel_dates.clone()),
            party_size: trip.party_size.unwrap_or(1),
        }
    }
}

/// Concurrent fan-out client over the configured provider endpoints
pub struct ProviderAggregator {
    client: Client,
    endpoints: Vec<ProviderEndpoint>,
    api_key: Option<String>,
    deadline: Duration,
    min_results: usize,
}

impl ProviderAggregator {
    /// Create a new aggregator from injected configuration
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("TripFlow/0.1.0")
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoints: config.effective_endpoints(),
            api_key: config.api_key.clone(),
            deadline: Duration::from_secs(config.deadline_seconds),
            min_results: config.min_results,
        })
    }

    /// Fetch all configured categories concurrently.
    ///
    /// Every endpoint outcome is captured independently: a success fills the
    /// category's slot, while an HTTP error, transport fault, malformed JSON
    /// body or fired deadline leaves the slot empty and appends a
    /// human-readable message to `errors`. Individual provider calls are
    /// never retried here.
    #[instrument(skip(self, query), fields(destination = %query.destination))]
    pub async fn aggregate(&self, query: &ProviderQuery) -> AggregationResult {
        let fetches = self.endpoints.iter().map(|endpoint| async move {
            let outcome =
                tokio::time::timeout(self.deadline, self.fetch_category(endpoint, query)).await;
            let settled = match outcome {
                Ok(Ok(records)) => Some(records),
                Ok(Err(err)) => {
                    warn!("Provider fetch for {} failed: {}", endpoint.category.plural(), err);
                    None
                }
                Err(_) => {
                    warn!(
                        "Provider fetch for {} exceeded the {}s deadline",
                        endpoint.category.plural(),
                        self.deadline.as_secs()
                    );
                    None
                }
            };
            (endpoint.category, settled)
        });

        // settle-all join: waits for every fetch regardless of outcome
        let settled = futures::future::join_all(fetches).await;

        let mut result = AggregationResult::new();
        for (category, outcome) in settled {
            match outcome {
                Some(records) => *result.slot_mut(category) = records,
                None => result
                    .errors
                    .push(format!("Failed to fetch {}", category.plural())),
            }
        }

        debug!(
            "Aggregated {} records across {} categories ({} errors)",
            result.total_records(),
            self.endpoints.len(),
            result.errors.len()
        );
        result
    }

    /// One provider round trip: request, status check, JSON body, extraction,
    /// sanitation. This is the single boundary where transport faults are
    /// converted into structured provider errors.
    async fn fetch_category(
        &self,
        endpoint: &ProviderEndpoint,
        query: &ProviderQuery,
    ) -> std::result::Result<Vec<CanonicalRecord>, TripFlowError> {
        let url = self.build_url(endpoint, query);
        debug!("Fetching {} from {}", endpoint.category.plural(), url);

        let mut request = self.client.get(&url);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| TripFlowError::provider(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TripFlowError::provider(format!(
                "{} endpoint returned {}",
                endpoint.category.plural(),
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| TripFlowError::provider(format!("invalid JSON body: {e}")))?;

        // an unrecognized payload shape is an empty result, not an error
        let raw = extract::extract_items(&payload, endpoint.category);
        Ok(sanitize::sanitize_records(
            &raw,
            endpoint.category,
            self.min_results,
        ))
    }

    fn build_url(&self, endpoint: &ProviderEndpoint, query: &ProviderQuery) -> String {
        let mut url = format!(
            "{}?city={}&guests={}&limit={}",
            endpoint.url,
            urlencoding::encode(&query.destination),
            query.party_size,
            self.min_results
        );
        if let Some(date) = &query.date {
            url.push_str(&format!("&date={}", urlencoding::encode(date)));
        }
        if wants_origin(endpoint.category) {
            if let Some(origin) = &query.origin {
                url.push_str(&format!("&origin={}", urlencoding::encode(origin)));
            }
        }
        url
    }
}

/// Point-to-point categories also carry the departure city
fn wants_origin(category: TravelCategory) -> bool {
    matches!(
        category,
        TravelCategory::Bus | TravelCategory::Train | TravelCategory::Car
    )
}
