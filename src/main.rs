use std::sync::Arc;

use anyhow::{Context, Result};
use gemini_gateway::{
    config::GatewayConfig,
    logging::{init_logging, LoggingConfig},
    models::ModelParams,
    server::{self, AppState},
    GenerativeModel, RequestPipeline, UploadStore,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = GatewayConfig::from_env()?;
    init_logging(LoggingConfig {
        level: config.log_level,
        json_format: config.log_json,
    });

    let mut model = GenerativeModel::new(
        config.api_key.clone(),
        ModelParams::builder().model(config.model.clone()).build(),
    )
    .with_base_url(config.base_url.clone());
    if let Some(timeout) = config.request_timeout {
        model = model.with_timeout(timeout)?;
    }

    let uploads = UploadStore::new(config.upload_dir.clone()).with_context(|| {
        format!("creating upload directory {}", config.upload_dir.display())
    })?;
    let pipeline = RequestPipeline::new(Arc::new(model));
    let app = server::router(AppState::new(pipeline, uploads), config.max_upload_bytes);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, model = %config.model, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
