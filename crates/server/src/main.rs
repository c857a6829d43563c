//! Plebiscite server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{Router, middleware};
use plebiscite_api::{AppState, auth_middleware, router as api_router};
use plebiscite_common::Config;
use plebiscite_core::{
    GovernanceRules, JobService, JobWorkerContext, NotifierService, Services, TracingNotifier,
    spawn_revoke_scheduler,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upper bound on request handling; workflow operations hold a transaction.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On non-Unix systems only Ctrl+C is observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plebiscite=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting plebiscite server...");

    // Load configuration, from an explicit file if one is named
    let config = match std::env::var("PLEBISCITE_CONFIG") {
        Ok(path) => Config::from_file(&path)
            .with_context(|| format!("failed to load configuration from {path}"))?,
        Err(_) => Config::load().context("failed to load configuration")?,
    };
    let rules = GovernanceRules::from_config(&config.governance)?;

    let db = plebiscite_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    plebiscite_db::migrate(&db).await?;
    info!("Migrations completed");

    let notifier: NotifierService = Arc::new(TracingNotifier);
    let services = Services::new(Arc::new(db), rules, notifier);

    // Background jobs: periodic auto-revocation
    let jobs = JobService::new();
    let sender = jobs.sender();
    let worker = jobs.start(JobWorkerContext {
        proposals: services.proposals.clone(),
    });
    let scheduler = spawn_revoke_scheduler(
        sender,
        Duration::from_secs(config.governance.revoke_job_interval_secs),
    );
    info!(
        interval_secs = config.governance.revoke_job_interval_secs,
        "Revocation scheduler started"
    );

    let state = AppState::new(services);
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let ip = config
        .server
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("invalid server host: {}", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stopping the scheduler drops the last sender, which ends the worker.
    scheduler.abort();
    if let Err(e) = worker.await {
        error!(error = %e, "Job worker ended abnormally");
    }

    info!("Server shutdown complete");
    Ok(())
}
