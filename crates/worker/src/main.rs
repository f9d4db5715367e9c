use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workplan_external::info_rtu::{InfoRtuClient, RtuCredentials};
use workplan_external::spatial::SpatialClient;
use workplan_pipeline::adapters::production_ports;
use workplan_pipeline::ImportOrchestrator;
use workplan_worker::config::WorkerConfig;
use workplan_worker::scheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = WorkerConfig::from_env().context("Invalid worker configuration")?;

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "workplan_worker=debug,workplan_pipeline=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    tracing::info!(
        interval_secs = config.interval.as_secs(),
        batch_size = config.import.batch_size,
        "Loaded worker configuration"
    );

    // --- Database ---
    let pool = workplan_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    workplan_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    workplan_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    // --- HTTP clients ---
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let rtu = InfoRtuClient::with_client(
        http.clone(),
        config.rtu_api_url.clone(),
        RtuCredentials {
            username: config.rtu_username.clone(),
            password: config.rtu_password.clone(),
        },
    );
    let spatial = SpatialClient::with_client(http, config.spatial_api_url.clone());

    let orchestrator = ImportOrchestrator::new(production_ports(pool, rtu, spatial), config.import.clone());

    // --- One-shot mode ---
    if config.interval.is_zero() {
        tracing::info!("Running a single blocking RTU import");
        scheduler::trigger(&orchestrator, true).await;
        return Ok(());
    }

    // --- Scheduler ---
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(scheduler::run(
        orchestrator,
        config.interval,
        config.blocking,
        cancel.clone(),
    ));

    shutdown_signal().await;
    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(30), handle).await;
    tracing::info!("Worker stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C), shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
