#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use quizforge_server::handler::routes;
use quizforge_server::service::ServiceState;
use tokio_util::sync::CancellationToken;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "quizforge_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "quizforge_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "quizforge_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    log_startup_info();

    cli.server
        .validate()
        .context("invalid server configuration")?;

    let service_config = cli.service.to_service_config();
    let state = ServiceState::from_config(&service_config)
        .await
        .context("failed to create service state")?;

    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        nats_url = %service_config.nats_url,
        worker_concurrency = cli.worker.worker_concurrency,
        worker_starts_per_second = cli.worker.worker_starts_per_second,
        "service configuration"
    );

    // The worker shares the process with the API; a cancellation token
    // stops job intake while in-flight jobs drain.
    let cancel = CancellationToken::new();
    let worker = state.generation_worker(cli.worker.to_worker_config());
    let worker_cancel = cancel.clone();
    let worker_task = tokio::spawn(async move { worker.run(worker_cancel).await });

    let router = routes(state.clone());
    server::serve(router, &cli.server)
        .await
        .context("server terminated abnormally")?;

    // Stop intake, drain in-flight jobs, then release the queue connection.
    cancel.cancel();
    match tokio::time::timeout(cli.server.shutdown_timeout(), worker_task).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(err))) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                "worker stopped with error"
            );
        }
        Ok(Err(join_err)) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %join_err,
                "worker task panicked"
            );
        }
        Err(_) => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs = cli.server.shutdown_timeout,
                "worker did not drain within the shutdown timeout"
            );
        }
    }

    if let Err(err) = state.nats_client().close().await {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            "failed to flush queue connection"
        );
    }

    Ok(())
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting quizforge server"
    );

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        "build information"
    );
}
