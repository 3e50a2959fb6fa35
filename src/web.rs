use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::TripFlowConfig;
use crate::email;
use crate::orchestrator::Orchestrator;

pub async fn run(config: TripFlowConfig) -> Result<()> {
    let orchestrator = Arc::new(Orchestrator::from_config(&config)?);
    let mailer = email::mailer_from_config(&config.email)?;
    let state = AppState {
        orchestrator,
        mailer,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", api::router(state))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(60)))
        .layer(cors);

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        "TripFlow API running at http://localhost:{}",
        config.server.port
    );
    axum::serve(listener, app).await?;
    Ok(())
}
