//! Startup orchestration.
//!
//! # Order
//! - Configuration is loaded and validated by the caller
//! - Metrics endpoint (optional)
//! - Server state: stores, notifier, locale resolver
//! - Listener bound last, so traffic only arrives when ready

use tokio::net::TcpListener;

use crate::config::SiteConfig;
use crate::http::SiteServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Bring the server up and run it until a termination signal.
pub async fn run(config: SiteConfig) -> Result<(), std::io::Error> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = SiteServer::new(config);

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    server.run(listener, shutdown).await
}
