//! MVC dispatch service
//!
//! Serves the demo application over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ Dispatcher
//!                     (request id,     │
//!                      limits, trace)  ├─▶ RouteTable (first match wins)
//!                                      ├─▶ ControllerFactory (policy)
//!                                      ├─▶ value providers + model binders
//!                                      ├─▶ filter chain ─▶ action
//!                                      └─▶ ActionResult ─▶ Response
//!     ◀──────────────
//!     Client Response
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use mvc_dispatch::config::{load_config, validate_config, AppConfig, ConfigError};
use mvc_dispatch::http::HttpServer;
use mvc_dispatch::lifecycle::{self, signals, Shutdown};
use mvc_dispatch::observability::{logging, metrics};

/// MVC dispatch service.
#[derive(Debug, Parser)]
#[command(name = "mvc-dispatch", version, about)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

fn load(args: &Args) -> Result<AppConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load(&args)?;

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "mvc-dispatch starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        policy = ?config.dispatch.policy,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let dispatcher = lifecycle::build_dispatcher(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let stopped = shutdown.wait();
    signals::spawn_signal_handler(shutdown.clone());

    HttpServer::new(dispatcher, &config).run(listener, stopped).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
