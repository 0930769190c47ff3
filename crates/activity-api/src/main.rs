//! Activity log REST API server.

use activity_api::config::ServerConfig;
use activity_api::server::{self, AppState};
use activity_log::{spawn_retention, ActivityLog};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let backend = config.build_backend()?;
    let log = Arc::new(ActivityLog::open(backend, config.log_config()).await);

    if let Some(policy) = config.retention.clone() {
        tracing::info!(
            max_age_days = policy.max_age_days,
            interval_secs = policy.interval.as_secs(),
            "retention worker enabled"
        );
        spawn_retention(Arc::clone(&log), policy);
    }

    let app = server::router(Arc::new(AppState { log }));
    tracing::info!("activity API listening on {}", config.listen);
    axum::serve(
        tokio::net::TcpListener::bind(config.listen).await?,
        app.into_make_service(),
    )
    .await?;
    Ok(())
}
