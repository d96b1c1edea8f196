//! HSI figure proxy.
//!
//! Serves `GET /api/ml/hsi/figure/{dataset_id}/{image_type}` by validating
//! the two parameters and relaying the JPEG rendered by the ML image service.
//!
//! ```text
//!     Client                 figure proxy                      ML image service
//!       │  GET /api/ml/hsi/figure/2/gt  │                             │
//!       │──────────────────────────────▶│ validate dataset / type     │
//!       │                               │  GET /hsi/figure/2/gt       │
//!       │                               │────────────────────────────▶│
//!       │                               │◀──────── image/jpeg ────────│
//!       │◀── 200 image/jpeg, cached 1h ─│                             │
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use hsi_figure_proxy::config::{load_config, ConfigOverrides};
use hsi_figure_proxy::observability::{logging, metrics};
use hsi_figure_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "hsi-figure-proxy", version)]
#[command(about = "Validating proxy for HSI figures rendered by the ML image service", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "HSI_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the ML image service (default http://localhost:8000).
    #[arg(long, env = "ML_SERVICE_URL")]
    ml_service_url: Option<String>,

    /// Address to listen on (default 0.0.0.0:3000).
    #[arg(short, long, env = "BIND_ADDRESS")]
    bind_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        bind_address: cli.bind_address,
        upstream_url: cli.ml_service_url,
    };
    let config = load_config(cli.config.as_deref(), &overrides)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("hsi-figure-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address already checked by config validation.
        let addr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics exporter");
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    shutdown.trigger_on_signal().await;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
