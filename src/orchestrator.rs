//! Trip-planning orchestration
//!
//! Composes the pipeline: requirement resolution, provider aggregation, and
//! summarization behind the retry wrapper. One logical task per request; a
//! request that ends in `NeedsClarification` is terminal and must be
//! resubmitted by the caller with the missing fields filled in (or with
//! `forceProceed`).

use crate::aggregator::{ProviderAggregator, ProviderQuery};
use crate::config::{DefaultsConfig, TripFlowConfig};
use crate::error::TripFlowError;
use crate::models::{AggregationResult, ResolvedTrip, TripRequest};
use crate::requirements::{self, Resolution};
use crate::retry::{classify_transient, with_retries};
use crate::upstream::{Clarifier, Summarizer, UpstreamClient};
use anyhow::Result as AnyResult;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Pipeline states, in request order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrchestrationState {
    CollectingInput,
    Ready,
    Aggregating,
    Summarizing,
    Done,
    NeedsClarification,
}

fn transition(from: OrchestrationState, to: OrchestrationState) -> OrchestrationState {
    debug!("Orchestration state: {from:?} -> {to:?}");
    to
}

/// Terminal outcome of a planning request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanOutcome {
    /// Required fields are missing; the caller has to resubmit
    #[serde(rename_all = "camelCase")]
    NeedsInfo {
        missing_fields: Vec<String>,
        questions: Vec<String>,
    },
    /// The trip was aggregated and summarized
    #[serde(rename = "ok", rename_all = "camelCase")]
    Complete {
        summary: String,
        aggregation_result: AggregationResult,
    },
}

/// Top-level composition of the aggregation pipeline
pub struct Orchestrator {
    aggregator: ProviderAggregator,
    summarizer: Arc<dyn Summarizer>,
    clarifier: Option<Arc<dyn Clarifier>>,
    defaults: DefaultsConfig,
    max_attempts: u32,
    base_delay: Duration,
}

impl Orchestrator {
    /// Assemble an orchestrator from its collaborators
    pub fn new(
        aggregator: ProviderAggregator,
        summarizer: Arc<dyn Summarizer>,
        clarifier: Option<Arc<dyn Clarifier>>,
        config: &TripFlowConfig,
    ) -> Self {
        Self {
            aggregator,
            summarizer,
            clarifier,
            defaults: config.defaults.clone(),
            max_attempts: config.upstream.max_attempts,
            base_delay: Duration::from_millis(config.upstream.base_delay_ms),
        }
    }

    /// Build the full production wiring from configuration
    pub fn from_config(config: &TripFlowConfig) -> AnyResult<Self> {
        let aggregator = ProviderAggregator::new(&config.providers)?;
        let upstream = Arc::new(UpstreamClient::new(&config.upstream)?);
        Ok(Self::new(
            aggregator,
            upstream.clone(),
            Some(upstream),
            config,
        ))
    }

    /// Run one trip request through the pipeline.
    ///
    /// Returns `NeedsInfo` when required fields are missing and the caller
    /// did not force, otherwise aggregates all providers and produces the
    /// summary. Transient summarizer failures are retried with backoff;
    /// exhausting the attempts is fatal for the request.
    #[instrument(skip(self, request))]
    pub async fn plan(&self, request: TripRequest) -> crate::Result<PlanOutcome> {
        let state = OrchestrationState::CollectingInput;

        match requirements::resolve(&request, &self.defaults) {
            Resolution::NeedsInfo(missing_fields) => {
                transition(state, OrchestrationState::NeedsClarification);
                info!("Trip request needs clarification: {:?}", missing_fields);
                let questions = self.clarifying_questions(&missing_fields, &request).await;
                Ok(PlanOutcome::NeedsInfo {
                    missing_fields,
                    questions,
                })
            }
            Resolution::Ready(trip) => {
                let state = transition(state, OrchestrationState::Ready);
                self.plan_ready(state, trip).await
            }
        }
    }

    async fn plan_ready(
        &self,
        state: OrchestrationState,
        trip: ResolvedTrip,
    ) -> crate::Result<PlanOutcome> {
        info!("Planning trip: {}", trip.describe());

        let state = transition(state, OrchestrationState::Aggregating);
        let aggregation = self.aggregator.aggregate(&ProviderQuery::from(&trip)).await;
        if !aggregation.errors.is_empty() {
            warn!(
                "Aggregation finished with {} provider error(s)",
                aggregation.errors.len()
            );
        }

        let state = transition(state, OrchestrationState::Summarizing);
        let summary = with_retries(
            || self.summarizer.summarize(&trip, &aggregation),
            self.max_attempts,
            self.base_delay,
        )
        .await
        .map_err(|err| {
            if classify_transient(&err) {
                TripFlowError::orchestration(format!(
                    "summarization failed after {} attempts: {err:#}",
                    self.max_attempts
                ))
            } else {
                TripFlowError::upstream(format!("{err:#}"), false)
            }
        })?;

        transition(state, OrchestrationState::Done);
        Ok(PlanOutcome::Complete {
            summary,
            aggregation_result: aggregation,
        })
    }

    /// Ask the clarifier collaborator for questions, passing its output
    /// through verbatim; fall back to generic per-field questions when the
    /// collaborator is absent or fails.
    async fn clarifying_questions(
        &self,
        missing_fields: &[String],
        request: &TripRequest,
    ) -> Vec<String> {
        if let Some(clarifier) = &self.clarifier {
            match clarifier.clarifying_questions(missing_fields, request).await {
                Ok(questions) if !questions.is_empty() => return questions,
                Ok(_) => debug!("Clarifier returned no questions, using fallbacks"),
                Err(err) => warn!("Clarifier failed, using fallback questions: {err:#}"),
            }
        }
        missing_fields.iter().map(|f| fallback_question(f)).collect()
    }
}

fn fallback_question(field: &str) -> String {
    match field {
        "destination" => "Where would you like to go?".to_string(),
        "durationDays" => "How many days will your trip last?".to_string(),
        other => format!("Could you tell us more about your {other}?"),
    }
}
