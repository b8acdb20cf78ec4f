//! HTTP server lifecycle.

mod shutdown;

use std::io;

use axum::Router;
use tokio::net::TcpListener;

pub use self::shutdown::shutdown_signal;
use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;

/// Serves the router until a shutdown signal arrives.
pub async fn serve(router: Router, config: &ServerConfig) -> io::Result<()> {
    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server bound to all interfaces (0.0.0.0) - ensure firewall is configured"
        );
    }

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %addr,
        "Server listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout()))
        .await
}
