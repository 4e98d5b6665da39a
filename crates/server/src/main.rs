use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubestream_core::{
    create_credential_supplier, load_config, validate_config, BatchOrchestrator, HttpFetcher,
    UploadQueue, YouTubeUploader,
};
use tubestream_server::api::{create_router, WsBroadcaster};
use tubestream_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("TUBESTREAM_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {}", config.auth.method.as_str());

    let credentials =
        create_credential_supplier(&config.auth).context("Failed to create credential supplier")?;
    info!("Using credential supplier: {}", credentials.method_name());

    let fetcher = Arc::new(
        HttpFetcher::new(config.fetcher.clone()).context("Failed to create fetcher")?,
    );
    let uploader = Arc::new(
        YouTubeUploader::new(config.uploader.clone()).context("Failed to create uploader")?,
    );

    // Broadcaster first so the queue can publish every change to it
    let ws_broadcaster = WsBroadcaster::default();
    let queue = Arc::new(
        UploadQueue::new(config.queue.clone())
            .with_update_callback(ws_broadcaster.queue_callback()),
    );

    let orchestrator = Arc::new(BatchOrchestrator::new(
        config.orchestrator.clone(),
        queue,
        fetcher,
        uploader,
        credentials,
    ));
    info!("Batch orchestrator ready");

    let state = Arc::new(AppState::new(config.clone(), orchestrator, ws_broadcaster));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
