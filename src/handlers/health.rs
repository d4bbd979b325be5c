//! Health, readiness, and statistics endpoints.
//!
//! - `GET /health` - Always 200; reports Redis connectivity in the body
//! - `GET /ready` - Readiness probe; the service stays ready without Redis
//!   because rate limiting degrades to the in-memory fallback
//! - `GET /stats` - Catalog counts and uptime

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use tracing::instrument;

use crate::models::{HealthResponse, StatsResponse};
use crate::state::AppState;

/// Health check endpoint.
///
/// Returns 200 with status details; `degraded` means the distributed
/// rate-limit backend is not configured or unreachable, and counters are
/// per-instance only.
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let redis_connected = state.registry.has_distributed_backend();

    Json(HealthResponse {
        status: if redis_connected {
            "healthy"
        } else {
            "degraded"
        }
        .to_string(),
        redis_connected,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Readiness check endpoint for orchestrator probes.
#[instrument]
pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}

/// Statistics endpoint.
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let catalog = state.catalog.stats().await;

    Json(StatsResponse {
        sites_total: catalog.sites_total,
        sites_pending: catalog.sites_pending,
        sites_enriched: catalog.sites_enriched,
        posts_total: catalog.posts_total,
        uptime_seconds: state.uptime_seconds(),
    })
}
