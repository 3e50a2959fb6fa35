use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tripflow::{TripFlowConfig, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = TripFlowConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!("Starting TripFlow v{}", tripflow::VERSION);
    web::run(config).await
}
