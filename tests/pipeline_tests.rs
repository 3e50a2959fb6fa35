//! End-to-end tests for the aggregation and orchestration pipeline
//!
//! Providers and the summarizer are stood in by wiremock servers, so these
//! tests exercise the real HTTP paths: fan-out, deadline handling, partial
//! failure, extraction, sanitation, padding, and retry around summarization.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tripflow::config::{ProviderEndpoint, ProvidersConfig, UpstreamConfig};
use tripflow::orchestrator::{Orchestrator, PlanOutcome};
use tripflow::upstream::UpstreamClient;
use tripflow::{
    ProviderAggregator, ProviderQuery, TravelCategory, TripFlowConfig, TripRequest,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoint(server: &MockServer, category: TravelCategory) -> ProviderEndpoint {
    ProviderEndpoint {
        category,
        url: format!("{}/{}", server.uri(), category.plural()),
    }
}

fn providers_config(server: &MockServer, categories: &[TravelCategory]) -> ProvidersConfig {
    ProvidersConfig {
        endpoints: categories.iter().map(|c| endpoint(server, *c)).collect(),
        deadline_seconds: 2,
        min_results: 5,
        ..Default::default()
    }
}

fn query() -> ProviderQuery {
    ProviderQuery {
        origin: Some("Porto".to_string()),
        destination: "Lisbon".to_string(),
        date: Some("2026-10-12".to_string()),
        party_size: 2,
    }
}

async fn mount_category(server: &MockServer, category: TravelCategory, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", category.plural())))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn two_failing_providers_leave_the_others_untouched() {
    let server = MockServer::start().await;

    mount_category(
        &server,
        TravelCategory::Hotel,
        json!({"hotels": [
            {"name": "The Grand Meridian", "price": "$180/night", "rating": 4.6,
             "location": "Baixa", "url": "https://hotels.example/meridian"},
            {"name": "Casa Azul", "price": 95, "location": "Alfama"},
        ]}),
    )
    .await;
    mount_category(
        &server,
        TravelCategory::Activity,
        json!({"data": [
            {"title": "Tram 28 District Tour", "price": "$25", "duration": "2h"},
        ]}),
    )
    .await;
    mount_category(
        &server,
        TravelCategory::Guide,
        json!([{"name": "Ana Figueira", "languages": ["Portuguese", "English"]}]),
    )
    .await;
    // buses: server error; cars: no mock mounted at all (404)
    Mock::given(method("GET"))
        .and(path("/buses"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let categories = [
        TravelCategory::Hotel,
        TravelCategory::Bus,
        TravelCategory::Car,
        TravelCategory::Activity,
        TravelCategory::Guide,
    ];
    let aggregator = ProviderAggregator::new(&providers_config(&server, &categories)).unwrap();
    let result = aggregator.aggregate(&query()).await;

    assert_eq!(result.errors.len(), 2);
    assert!(result.errors.contains(&"Failed to fetch buses".to_string()));
    assert!(result.errors.contains(&"Failed to fetch cars".to_string()));

    // surviving categories are populated and padded to the minimum
    assert_eq!(result.hotels.len(), 5);
    assert_eq!(result.hotels[0].name(), "The Grand Meridian");
    assert_eq!(result.hotels[2].name(), "The Grand Meridian (Option 3)");
    assert_eq!(result.activities.len(), 5);
    assert_eq!(result.guides.len(), 5);

    // failed categories stay empty
    assert!(result.buses.is_empty());
    assert!(result.cars.is_empty());
}

#[tokio::test]
async fn slow_provider_is_recorded_without_delaying_the_others() {
    let server = MockServer::start().await;

    mount_category(
        &server,
        TravelCategory::Hotel,
        json!({"results": [{"name": "Harborview Inn"}]}),
    )
    .await;
    // trains answer far beyond the 2s aggregation deadline
    Mock::given(method("GET"))
        .and(path("/trains"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"trains": [{"name": "Atlantic Express"}]}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let categories = [TravelCategory::Hotel, TravelCategory::Train];
    let aggregator = ProviderAggregator::new(&providers_config(&server, &categories)).unwrap();

    let started = std::time::Instant::now();
    let result = aggregator.aggregate(&query()).await;

    // the join waited for the deadline, not for the slow provider
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.errors, vec!["Failed to fetch trains"]);
    assert_eq!(result.hotels.len(), 5);
    assert!(result.trains.is_empty());
}

#[tokio::test]
async fn unrecognized_payload_shape_is_empty_but_not_an_error() {
    let server = MockServer::start().await;

    mount_category(
        &server,
        TravelCategory::Hotel,
        json!({"message": "no inventory for these dates"}),
    )
    .await;
    mount_category(&server, TravelCategory::Guide, json!({"guides": []})).await;

    let categories = [TravelCategory::Hotel, TravelCategory::Guide];
    let aggregator = ProviderAggregator::new(&providers_config(&server, &categories)).unwrap();
    let result = aggregator.aggregate(&query()).await;

    assert!(result.errors.is_empty());
    assert!(result.hotels.is_empty());
    assert!(result.guides.is_empty());
}

#[tokio::test]
async fn provider_requests_carry_query_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/buses"))
        .and(query_param("city", "Lisbon"))
        .and(query_param("origin", "Porto"))
        .and(query_param("guests", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"buses": [{"name": "Night Line"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let categories = [TravelCategory::Bus];
    let aggregator = ProviderAggregator::new(&providers_config(&server, &categories)).unwrap();
    let result = aggregator.aggregate(&query()).await;

    assert!(result.errors.is_empty());
    assert_eq!(result.buses.len(), 5);
}

#[tokio::test]
async fn plan_retries_transient_summarizer_failures_to_completion() {
    let providers = MockServer::start().await;
    let upstream = MockServer::start().await;

    mount_category(
        &providers,
        TravelCategory::Hotel,
        json!({"hotels": [{"name": "The Grand Meridian", "rating": 4.6}]}),
    )
    .await;

    // two transient failures, then success
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"summaryText": "Five lovely days in Lisbon."})),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let mut config = TripFlowConfig::default();
    config.providers = providers_config(&providers, &[TravelCategory::Hotel]);
    config.upstream = UpstreamConfig {
        base_url: upstream.uri(),
        base_delay_ms: 10,
        ..Default::default()
    };

    let aggregator = ProviderAggregator::new(&config.providers).unwrap();
    let client = Arc::new(UpstreamClient::new(&config.upstream).unwrap());
    let orchestrator = Orchestrator::new(aggregator, client.clone(), Some(client), &config);

    let request = TripRequest {
        destination: Some("Lisbon".to_string()),
        duration_days: Some(5),
        party_size: Some(2),
        ..Default::default()
    };

    match orchestrator.plan(request).await.unwrap() {
        PlanOutcome::Complete {
            summary,
            aggregation_result,
        } => {
            assert_eq!(summary, "Five lovely days in Lisbon.");
            assert!(aggregation_result.errors.is_empty());
            assert_eq!(aggregation_result.hotels.len(), 5);
        }
        PlanOutcome::NeedsInfo { .. } => panic!("expected Complete"),
    }
}

#[tokio::test]
async fn plan_with_missing_fields_asks_the_clarifier() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/clarify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "questions": ["Where would you like to go?"]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let mut config = TripFlowConfig::default();
    // provider endpoints are never contacted on this path
    config.providers.endpoints = vec![ProviderEndpoint {
        category: TravelCategory::Hotel,
        url: "http://127.0.0.1:9/hotels".to_string(),
    }];
    config.upstream = UpstreamConfig {
        base_url: upstream.uri(),
        ..Default::default()
    };

    let aggregator = ProviderAggregator::new(&config.providers).unwrap();
    let client = Arc::new(UpstreamClient::new(&config.upstream).unwrap());
    let orchestrator = Orchestrator::new(aggregator, client.clone(), Some(client), &config);

    let request = TripRequest {
        duration_days: Some(3),
        ..Default::default()
    };

    match orchestrator.plan(request).await.unwrap() {
        PlanOutcome::NeedsInfo {
            missing_fields,
            questions,
        } => {
            assert_eq!(missing_fields, vec!["destination"]);
            assert_eq!(questions, vec!["Where would you like to go?"]);
        }
        PlanOutcome::Complete { .. } => panic!("expected NeedsInfo"),
    }
}
