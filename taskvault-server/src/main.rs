//! Taskvault server entry point.
//!
//! Wires the process-wide singletons together: one Redis backend, one
//! due-time resolver, one task store, then serves the HTTP API until a
//! shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskvault_core::{DueTimeResolver, WallClockResolver};
use taskvault_http::{build_router, AppState};
use taskvault_store::{RedisBackend, RedisConfig, TaskStore};

#[derive(Parser, Debug)]
#[command(name = "taskvault", version)]
#[command(about = "Redis-backed task tracking service")]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Redis connection URL
    #[arg(long, default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// Timeout for establishing the Redis connection, e.g. "5s"
    #[arg(long, default_value = "5s")]
    connect_timeout: humantime::Duration,

    /// Per-command Redis timeout, e.g. "2s"
    #[arg(long, default_value = "2s")]
    command_timeout: humantime::Duration,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run(cli).await {
        tracing::error!(error = %err, "server failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = RedisConfig::new(&cli.redis_url)
        .with_connect_timeout(cli.connect_timeout.into())
        .with_command_timeout(cli.command_timeout.into());
    let backend = RedisBackend::connect(&config)?;

    let resolver: Arc<dyn DueTimeResolver> = Arc::new(WallClockResolver);
    let store = Arc::new(TaskStore::new(Arc::new(backend), resolver.clone()));
    let app = build_router(AppState::new(store, resolver));

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    tracing::info!(addr = %cli.bind, "taskvault listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to install shutdown handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
