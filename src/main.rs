//! Load balancer binary entry point.
//!
//! Startup order: config → settings store → backend pool → limiter
//! (warmed from the store) → health monitor → HTTP server. Fatal startup
//! errors propagate out of `main` with a non-zero exit code; a signal
//! triggers graceful shutdown of the server and every background task.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loadgate::balancer::BackendPool;
use loadgate::config;
use loadgate::health::HealthMonitor;
use loadgate::lifecycle::{wait_for_signal, Shutdown};
use loadgate::ratelimit::RateLimiter;
use loadgate::storage::{MemoryStorage, PostgresStorage, Storage};
use loadgate::HttpServer;

#[derive(Parser)]
#[command(name = "loadgate")]
#[command(about = "HTTP load balancer with per-client rate limiting", long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loadgate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "loadgate starting");

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    tracing::info!(
        port = %config.server.port,
        backends = config.backends.len(),
        algorithm = %config.balancer.algorithm,
        storage = %config.storage.kind,
        "configuration loaded"
    );

    let storage: Arc<dyn Storage> = match config.storage.kind.as_str() {
        "postgres" => {
            let storage = PostgresStorage::connect(&config.storage.postgres).await?;
            tracing::info!(
                host = %config.storage.postgres.host,
                dbname = %config.storage.postgres.dbname,
                "connected to PostgreSQL"
            );
            Arc::new(storage)
        }
        _ => {
            tracing::info!("using in-memory settings store");
            Arc::new(MemoryStorage::new())
        }
    };

    let pool = Arc::new(BackendPool::new(
        &config.backends,
        &config.balancer.algorithm,
    )?);

    let limiter = RateLimiter::new(
        config.ratelimit.defaults.capacity,
        config.ratelimit.defaults.refill_rate,
        Arc::clone(&storage),
    );
    limiter.warm_up().await?;

    let shutdown = Shutdown::new();
    Arc::clone(&limiter).spawn_maintenance(&shutdown);

    let monitor = HealthMonitor::new(Arc::clone(&pool), config.healthcheck.clone());
    tokio::spawn(monitor.run(shutdown.signal()));

    let server_shutdown = shutdown.signal();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.begin_drain();
    });

    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.server.port)).await?;
    let server = HttpServer::new(pool, limiter);
    server.run(listener, server_shutdown).await?;

    storage.close().await?;

    tracing::info!("shutdown complete");
    Ok(())
}
