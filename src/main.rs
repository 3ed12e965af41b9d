//! Patient Segmentation Demo - Main Entry Point
//!
//! Loads the pre-trained artifacts, then serves the interactive demo page
//! and its prediction endpoint until shutdown.

use anyhow::{Context, Result};
use patient_segmentation::{
    config::AppConfig,
    metrics::{MetricsReporter, PredictionMetrics},
    models::inference::InferenceEngine,
    models::store::ArtifactStore,
    server::{AppState, DemoServer},
};
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patient_segmentation=info".parse()?),
        )
        .init();

    info!("Starting Patient Segmentation Demo");

    // Load configuration
    let config = AppConfig::load()?;
    info!(
        artifact_dir = %config.artifacts.dir,
        "Configuration loaded successfully"
    );

    // Load artifacts once for the process lifetime; failure here is fatal
    let store = ArtifactStore::shared(&config.artifacts)
        .context("Cannot serve predictions without artifacts")?;

    let engine = Arc::new(InferenceEngine::new(store));
    info!(
        features = engine.feature_count(),
        "Inference engine initialized"
    );

    // Initialize metrics and periodic reporter
    let metrics = Arc::new(PredictionMetrics::new());
    let reporter_metrics = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(reporter_metrics, 60);
        reporter.start().await;
    });

    // Serve the demo page until shutdown
    let state = Arc::new(AppState::new(
        engine,
        metrics.clone(),
        config.artifacts.banner_path(),
    ));
    DemoServer::start(state, &config.server.host, config.server.port).await?;

    info!("Demo server shutting down...");
    metrics.print_summary();

    Ok(())
}
