//! gh-relay: a GitHub acceleration proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request  /https://github.com/u/r/releases/download/v1/a.tgz
//!     ──────────────▶ http::server ──▶ routing::classify ──▶ Route { kind, target }
//!                                                │
//!                         ┌──────────────────────┴───────────────────┐
//!                         ▼                                          ▼
//!                 proxy::forward (generic)                  proxy::git (Smart HTTP)
//!                 headers · limits · rewrite                headers · limits · RouteMode
//!                         │                                          │
//!                         └──────────────▶ upstream ◀────────────────┘
//!                                             │
//!     Client Response ◀──── streamed body, 301 on overflow, or pages::ErrorPages
//!
//!     Cross-cutting: config (TOML + hot reload) · observability · lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gh_relay::config::{load_or_init, ConfigWatcher};
use gh_relay::http::HttpServer;
use gh_relay::lifecycle::{signals, Shutdown};
use gh_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "gh-relay")]
#[command(about = "GitHub acceleration proxy", long_about = None)]
struct Cli {
    /// Configuration file, created with defaults if missing.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_or_init(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load {}: {}", cli.config.display(), e);
            return Err(e.into());
        }
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gh-relay starting");
    tracing::info!(
        path = %cli.config.display(),
        bind_address = %config.server.bind_address,
        size_limit_mb = config.server.size_limit_mb,
        git_clone_mode = ?config.git_clone.mode,
        shell_editor = config.shell.editor,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let (watcher, config_updates) = ConfigWatcher::new(&cli.config);
    let _watch_handle = match watcher.run() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Config hot reload disabled");
            None
        }
    };

    let shutdown = Shutdown::new();
    signals::spawn_handler(&shutdown);

    let server = HttpServer::new(config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
