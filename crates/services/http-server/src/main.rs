//! HTTP server binary entry point
//!
//! Serves the demo pipeline (`{"values": ...}` in, `{"predictions": ...}`
//! out) under a single GET route. The wrapped step is the identity, or a
//! remote stage when one is configured.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (127.0.0.1:8080, route "/")
//! cargo run -p remotestage-http-server
//!
//! # Forward batches to another served pipeline
//! REMOTE_STAGE_URL="http://127.0.0.1:8081/" cargo run -p remotestage-http-server
//!
//! # With logging
//! RUST_LOG=debug cargo run -p remotestage-http-server
//! ```
//!
//! # Environment Variables
//!
//! - `REMOTESTAGE_CONFIG`: TOML config file (optional)
//! - `HTTP_BIND_ADDRESS`: Server bind address (default: `127.0.0.1:8080`)
//! - `HTTP_ROUTE`: Route to serve (default: `/`)
//! - `REMOTE_STAGE_URL`: URL of a remote stage to wrap (default: none)
//! - `REMOTE_STAGE_METHOD`: HTTP method for the remote stage (default: `GET`)
//! - `RUST_LOG`: Logging level (default: `info,tower_http=debug`)

mod config;
mod demo;

use anyhow::Context;
use config::Config;
use demo::{Matrix, PredictionsEncoder, ValuesDecoder};
use remotestage_core::Identity;
use remotestage_http::{HttpServer, RemoteStageCaller, RestApiWrapper};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::load().context("Failed to load configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.server.bind_address,
        route = %config.server.route,
        remote_stage = config.remote_stage.as_ref().map(|r| r.url.as_str()),
        "remotestage HTTP server starting"
    );

    let app = match &config.remote_stage {
        Some(remote) => {
            let caller = RemoteStageCaller::<Matrix>::from_config(remote)?;
            RestApiWrapper::new(ValuesDecoder, caller, PredictionsEncoder)
                .with_route(config.server.route.clone())?
                .get_app()
        }
        None => RestApiWrapper::new(ValuesDecoder, Identity::new(), PredictionsEncoder)
            .with_route(config.server.route.clone())?
            .get_app(),
    };

    // Create tokio runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("remotestage-http")
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        HttpServer::new(config.server.bind_address, app)
            .serve()
            .await
            .map_err(|e| {
                error!("Server error: {}", e);
                e
            })
    })?;

    info!("HTTP server shutdown complete");
    Ok(())
}
