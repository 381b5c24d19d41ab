//! Plant Database API
//!
//! Serves plants, locations and containers from a spreadsheet-backed
//! store, with a filter/query layer for chat integrations.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request ID, trace, timeout, body limit, rate limit)
//!                         │
//!                         ▼
//!                     api handlers ──▶ query engine (filters, formats)
//!                         │                   │
//!                         ▼                   ▼
//!                     garden::Catalog ──▶ Garden snapshot (plant → locations → containers)
//!                         │
//!                         ▼
//!                     store (JSON workbook file | Google Sheets)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use garden_db::config::load_or_default;
use garden_db::lifecycle::{open_catalog, wait_for_signal};
use garden_db::observability::{logging::init_logging, metrics::init_metrics};
use garden_db::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "garden-db", version, about = "Plant database API server")]
struct Args {
    /// Path to the TOML config file; defaults apply when it is missing.
    #[arg(short, long, default_value = "garden.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(&args.config)?;

    init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "garden-db starting");
    tracing::info!(
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        backend = ?config.store.backend,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let started = open_catalog(&config.store)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, started.catalog.clone());
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        _ = wait_for_signal() => {
            shutdown.trigger();
            (&mut server_task).await??;
        }
        result = &mut server_task => result??,
    }

    drop(started);
    tracing::info!("Shutdown complete");
    Ok(())
}
