//! # porchlightd — porchlight daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the registry, transports and repository (adapters)
//! - Construct application services, injecting adapters via port traits
//! - Spawn the schedule runner and, when enabled, the transcript watcher
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use porchlight_adapter_devices::{DeviceTransports, FileDeviceRegistry};
use porchlight_adapter_http_axum::state::AppState;
use porchlight_adapter_storage_sqlite_sqlx::SqliteScheduleRepository;
use porchlight_adapter_transcript::TranscriptWatcher;
use porchlight_app::ports::SystemClock;
use porchlight_app::schedule_runner::ScheduleRunner;
use porchlight_app::services::dispatcher::CommandDispatcher;
use porchlight_app::services::schedule_service::ScheduleService;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("unable to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("porchlightd starting");

    // Database
    let db = porchlight_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("unable to open schedule database")?;

    // Devices
    let registry = FileDeviceRegistry::new(
        config.registry.path.clone(),
        config.registry.default_kind,
        config.quirks()?,
    );
    tracing::info!(path = %registry.path().display(), "using device registry");
    let transports = DeviceTransports::new(&config.transport_config())?;

    // Services
    let dispatcher = Arc::new(CommandDispatcher::new(
        registry,
        transports,
        config.dispatch_policy(),
    ));
    let schedule_service = Arc::new(ScheduleService::new(SqliteScheduleRepository::new(
        db.pool().clone(),
    )));
    let active = schedule_service.rebuild_triggers().await?;
    tracing::info!(active, "schedules loaded");

    // Background tasks
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = Vec::new();

    let runner = ScheduleRunner::new(
        Arc::clone(&dispatcher),
        schedule_service.subscribe(),
        SystemClock,
    );
    tasks.push(tokio::spawn(runner.run(shutdown_rx.clone())));

    if config.transcript.enabled {
        let watcher = TranscriptWatcher::new(
            Arc::clone(&dispatcher),
            config.transcript.path.clone(),
            Duration::from_millis(config.transcript.poll_interval_ms),
            config.transcript.target,
        );
        tasks.push(tokio::spawn(watcher.run(shutdown_rx)));
    }

    // HTTP
    let state = AppState::from_arcs(dispatcher, schedule_service);
    let app = porchlight_adapter_http_axum::router::build(state, config.server.static_dir.clone());

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("unable to bind {bind_addr}"))?;
    tracing::info!("porchlightd listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tx.send_replace(true);
    for task in tasks {
        if let Err(err) = task.await {
            tracing::error!(error = %err, "background task panicked");
        }
    }
    db.close().await;

    tracing::info!("porchlightd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal");
}
