use std::net::SocketAddr;
use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use directory_api::{AppState, Config, RateLimiterRegistry, build_router, metrics, ratelimit, utils};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!(
        "Starting Directory API v{}",
        env!("CARGO_PKG_VERSION")
    );

    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the application, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {e}");
        exitcode::CONFIG
    })?;
    info!(
        host = %config.host,
        port = %config.port,
        site = %config.site_name,
        fallback_mode = %config.fallback_mode,
        "Configuration loaded"
    );

    // Connect the distributed rate-limit backend if configured. A failed
    // connection is not fatal: the registry degrades to the fallback
    // policy, which is the whole point of having one.
    let redis = match &config.redis_url {
        Some(url) => match ratelimit::connect(url).await {
            Ok(conn) => {
                info!("Connected to Redis rate-limit backend");
                Some(conn)
            }
            Err(e) => {
                warn!(error = %e, "Redis unavailable at startup - rate limiting will use the fallback policy");
                None
            }
        },
        None => {
            info!("Redis is disabled: REDIS_URL is not set");
            None
        }
    };

    let registry = RateLimiterRegistry::new(redis);

    // Start the Prometheus exporter if enabled
    if let Some(metrics_addr) = config.metrics_addr() {
        metrics::try_init_metrics(metrics_addr);
    } else {
        info!("Metrics disabled (METRICS_PORT=0)");
    }

    // Build application state and router
    let state = AppState::new(registry, config.clone());
    let app = build_router(state.clone());

    // Start server
    let addr: SocketAddr = config.server_addr().parse().map_err(|e| {
        error!("Invalid server address: {e}");
        exitcode::CONFIG
    })?;
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;

    info!("Server listening on http://{addr}");
    info!("API endpoints:");
    info!("  GET  /health          - Health check");
    info!("  GET  /ready           - Readiness check");
    info!("  GET  /stats           - Service statistics");
    info!("  GET  /api/sites       - List catalog entries");
    info!("  POST /api/sites       - Submit a site (rate limited)");
    info!("  GET  /api/sites/{{slug}} - Fetch one listing");
    info!("  GET  /api/enrich      - Trigger enrichment (HMAC)");
    info!("  POST /api/enrich      - Trigger enrichment (HMAC)");
    info!("  POST /api/blogs       - Publish a blog post (HMAC)");

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown_signal())
        .await
        .map_err(|e| {
            error!("Server error: {e}");
            exitcode::SOFTWARE
        })?;

    // Gracefully shutdown background tasks
    info!("HTTP server stopped, shutting down background tasks...");
    state.shutdown().await;

    info!("Server shutdown complete");
    Ok(())
}
