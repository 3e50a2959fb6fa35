//! Upstream language-model collaborators
//!
//! The core never generates text itself. Summaries and clarifying questions
//! come from external services reached through the narrow traits below; the
//! HTTP implementations talk to the configured gateway. Retry policy is NOT
//! applied here — the orchestrator wraps the summarization call in
//! [`crate::retry::with_retries`].

use crate::config::UpstreamConfig;
use crate::models::{AggregationResult, ResolvedTrip, TripRequest};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Produces the itinerary summary text for an aggregated trip
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        trip: &ResolvedTrip,
        aggregation: &AggregationResult,
    ) -> Result<String>;
}

/// Produces clarifying questions for an under-specified trip request
#[async_trait]
pub trait Clarifier: Send + Sync {
    async fn clarifying_questions(
        &self,
        missing_fields: &[String],
        partial: &TripRequest,
    ) -> Result<Vec<String>>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeRequest<'a> {
    trip_context: &'a ResolvedTrip,
    aggregation_result: &'a AggregationResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeResponse {
    summary_text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClarifyRequest<'a> {
    missing_fields: &'a [String],
    partial_context: &'a TripRequest,
}

#[derive(Deserialize)]
struct ClarifyResponse {
    questions: Vec<String>,
}

/// HTTP client against the language-model gateway
pub struct UpstreamClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl UpstreamClient {
    /// Create a new client from injected configuration
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("TripFlow/0.1.0")
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // keep the status code in the message so transient classification
            // can see it
            bail!("upstream returned {status}: {body}");
        }

        response
            .json()
            .await
            .with_context(|| format!("failed to parse response from {url}"))
    }
}

#[async_trait]
impl Summarizer for UpstreamClient {
    #[instrument(skip(self, trip, aggregation), fields(destination = %trip.destination))]
    async fn summarize(
        &self,
        trip: &ResolvedTrip,
        aggregation: &AggregationResult,
    ) -> Result<String> {
        debug!(
            "Requesting summary for {} ({} records)",
            trip.describe(),
            aggregation.total_records()
        );
        let response: SummarizeResponse = self
            .post_json(
                "/summarize",
                &SummarizeRequest {
                    trip_context: trip,
                    aggregation_result: aggregation,
                },
            )
            .await?;
        Ok(response.summary_text)
    }
}

#[async_trait]
impl Clarifier for UpstreamClient {
    #[instrument(skip(self, partial))]
    async fn clarifying_questions(
        &self,
        missing_fields: &[String],
        partial: &TripRequest,
    ) -> Result<Vec<String>> {
        let response: ClarifyResponse = self
            .post_json(
                "/clarify",
                &ClarifyRequest {
                    missing_fields,
                    partial_context: partial,
                },
            )
            .await?;
        Ok(response.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> UpstreamConfig {
        UpstreamConfig {
            base_url: server.uri(),
            api_key: Some("test_key".to_string()),
            ..Default::default()
        }
    }

    fn trip() -> ResolvedTrip {
        ResolvedTrip {
            destination: "Lisbon".to_string(),
            duration_days: 4,
            origin: None,
            budget_usd: None,
            party_size: Some(2),
            interests: vec!["food".to_string()],
            travel_dates: None,
            check_in_date: None,
            check_out_date: None,
            user_query: None,
        }
    }

    #[tokio::test]
    async fn test_summarize_posts_context_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .and(body_partial_json(
                json!({"tripContext": {"destination": "Lisbon"}}),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"summaryText": "Four days in Lisbon."})),
            )
            .mount(&server)
            .await;

        let client = UpstreamClient::new(&config_for(&server)).unwrap();
        let summary = client
            .summarize(&trip(), &AggregationResult::new())
            .await
            .unwrap();
        assert_eq!(summary, "Four days in Lisbon.");
    }

    #[tokio::test]
    async fn test_summarize_surfaces_status_code_in_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(&config_for(&server)).unwrap();
        let err = client
            .summarize(&trip(), &AggregationResult::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_clarify_returns_questions_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/clarify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "questions": ["Where would you like to go?", "How many days?"]
            })))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(&config_for(&server)).unwrap();
        let questions = client
            .clarifying_questions(
                &["destination".to_string(), "durationDays".to_string()],
                &TripRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0], "Where would you like to go?");
    }
}
