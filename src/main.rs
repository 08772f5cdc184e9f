use std::sync::Arc;

use thesis_workflow::api::router;
use thesis_workflow::config::AppConfig;
use thesis_workflow::services::ThesisService;
use thesis_workflow::state::AppState;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "thesis_workflow=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    info!("storage backend: {:?}", config.storage);

    let gateway = config.connect_storage().await?;
    let service = Arc::new(ThesisService::new(gateway));
    service.health().await?;

    let state = AppState { service };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
