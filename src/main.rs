//! PC repair site server.
//!
//! Serves the pre-rendered multilingual site and its small JSON API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────▶ request id ─▶ trace ─▶ timeout/body limit ─▶ locale middleware
//!                                                              │
//!                               ┌──────────────────────────────┴───────────┐
//!                               ▼                                          ▼
//!                        /api/* handlers                           ServeDir (pages)
//!                     contact │ autosave │ quote                  /{en,hu,sr}/...
//!                               │
//!                    ┌──────────┴──────────┐
//!                    ▼                     ▼
//!              rate limiter         optional sinks
//!         (durable or in-memory)   (email, durable records)
//! ```

use std::path::PathBuf;

use clap::Parser;

use pc_repair_site::config::load_config;
use pc_repair_site::lifecycle::startup;
use pc_repair_site::observability::logging;

#[derive(Parser)]
#[command(name = "pc-repair-site")]
#[command(about = "Multilingual PC repair site server", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "SITE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;

    tracing::info!("pc-repair-site v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        durable_store = config.store.credentials().is_some(),
        email = config.email.is_complete(),
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
