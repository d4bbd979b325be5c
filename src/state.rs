//! Shared application state for Axum handlers.
//!
//! The state is cloned per request; everything inside is an `Arc` or
//! cheap. It owns the process-wide pieces the utilities need a lifecycle
//! for:
//!
//! - the [`RateLimiterRegistry`] (limiter cache + fallback counters)
//! - the in-memory catalog
//! - a background task that periodically sweeps expired fallback counters
//!   so abandoned keys do not accumulate for a full window
//!
//! Background tasks are managed with `tokio_util`'s `TaskTracker` and
//! `CancellationToken`; call [`AppState::shutdown`] before exit to stop
//! them cleanly.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::config::Config;
use crate::ratelimit::RateLimiterRegistry;
use crate::services::CatalogService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Site/post catalog
    pub catalog: Arc<CatalogService>,
    /// Rate limiter registry (distributed + fallback)
    pub registry: Arc<RateLimiterRegistry>,
    /// Application configuration
    pub config: Arc<Config>,
    /// Timestamp when the application started
    pub started_at: Instant,
    /// Tracks spawned background tasks for graceful shutdown
    task_tracker: TaskTracker,
    /// Cancellation token for signaling background tasks to stop
    cancellation_token: CancellationToken,
}

impl AppState {
    /// Create application state and spawn background tasks.
    pub fn new(registry: RateLimiterRegistry, config: Config) -> Self {
        let state = Self {
            catalog: Arc::new(CatalogService::new()),
            registry: Arc::new(registry),
            config: Arc::new(config),
            started_at: Instant::now(),
            task_tracker: TaskTracker::new(),
            cancellation_token: CancellationToken::new(),
        };

        state.spawn_counter_sweep_task();

        state
    }

    /// Spawn the periodic sweep of expired in-memory rate-limit counters.
    ///
    /// The counters also self-evict lazily on access; the sweep bounds
    /// memory for identifiers that never return.
    fn spawn_counter_sweep_task(&self) {
        let registry = Arc::clone(&self.registry);
        let sweep_interval = self.config.counter_sweep_interval;
        let cancel = self.cancellation_token.clone();

        self.task_tracker.spawn(async move {
            let mut ticker = interval(sweep_interval);
            ticker.tick().await; // Skip the first immediate tick

            loop {
                tokio::select! {
                    biased; // Check cancellation first

                    _ = cancel.cancelled() => {
                        debug!("Counter sweep task received cancellation signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        let evicted = registry.memory().sweep_expired();
                        if evicted > 0 {
                            debug!(evicted, "Swept expired rate-limit counters");
                        }
                    }
                }
            }

            debug!("Counter sweep task shutting down");
        });
    }

    /// Gracefully shut down all background tasks.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown of background tasks");

        self.cancellation_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;

        info!("All background tasks have completed");
    }

    /// Get the application uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_builds_and_shuts_down() {
        let state = AppState::new(RateLimiterRegistry::new(None), Config::default());

        assert!(!state.registry.has_distributed_backend());
        state.shutdown().await;
    }

    #[tokio::test]
    async fn test_uptime_is_monotonic() {
        let state = AppState::new(RateLimiterRegistry::new(None), Config::default());

        let first = state.uptime_seconds();
        assert!(state.uptime_seconds() >= first);
        state.shutdown().await;
    }
}
