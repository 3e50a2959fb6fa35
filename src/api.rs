//! HTTP API for the planning and checkout pipelines

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use std::sync::Arc;

use crate::checkout;
use crate::email::Mailer;
use crate::error::TripFlowError;
use crate::models::{CheckoutReceipt, CheckoutRequest, TripRequest};
use crate::orchestrator::{Orchestrator, PlanOutcome};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub mailer: Arc<dyn Mailer>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plan", post(plan_trip))
        .route("/checkout", post(process_checkout))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn plan_trip(
    State(state): State<AppState>,
    Json(request): Json<TripRequest>,
) -> Result<Json<PlanOutcome>, (StatusCode, String)> {
    match state.orchestrator.plan(request).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(err) => Err(error_response(err)),
    }
}

async fn process_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutReceipt>, (StatusCode, String)> {
    match checkout::process_checkout(&request, state.mailer.as_ref()).await {
        Ok(receipt) => Ok(Json(receipt)),
        Err(err) => Err(error_response(err)),
    }
}

fn error_response(err: TripFlowError) -> (StatusCode, String) {
    let status = match &err {
        TripFlowError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TripFlowError::Upstream { .. } | TripFlowError::Orchestration { .. } => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Request failed: {err}");
    }
    (status, err.user_message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status_mapping() {
        let (status, message) = error_response(TripFlowError::validation("bad email"));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(message.contains("bad email"));

        let (status, _) = error_response(TripFlowError::orchestration("gave up"));
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, _) = error_response(TripFlowError::general("boom"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
