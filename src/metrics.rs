//! Prometheus metrics for application observability.
//!
//! Metrics are exposed via a dedicated HTTP endpoint (default port 9090).
//!
//! # Available Metrics
//!
//! ## Counters
//! - `directory_auth_failures_total` - HMAC authentication failures (label: reason)
//! - `directory_rate_limit_checks_total` - Rate limit verdicts (labels: backend, outcome)
//! - `directory_sites_submitted_total` - Sites accepted into the catalog
//! - `directory_posts_created_total` - Blog posts published via the API
//! - `directory_enrichment_runs_total` - Enrichment runs triggered
//! - `directory_sites_enriched_total` - Sites promoted by enrichment

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const AUTH_FAILURES_TOTAL: &str = "directory_auth_failures_total";
    pub const RATE_LIMIT_CHECKS_TOTAL: &str = "directory_rate_limit_checks_total";
    pub const SITES_SUBMITTED_TOTAL: &str = "directory_sites_submitted_total";
    pub const POSTS_CREATED_TOTAL: &str = "directory_posts_created_total";
    pub const ENRICHMENT_RUNS_TOTAL: &str = "directory_enrichment_runs_total";
    pub const SITES_ENRICHED_TOTAL: &str = "directory_sites_enriched_total";
}

/// Initialize the Prometheus metrics exporter.
///
/// Sets up metric descriptions and starts the Prometheus HTTP listener on
/// the given address.
///
/// # Errors
///
/// Returns a message when the exporter cannot be installed (port in use,
/// or a second initialization).
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::AUTH_FAILURES_TOTAL,
        "Total HMAC authentication failures by reason"
    );
    describe_counter!(
        names::RATE_LIMIT_CHECKS_TOTAL,
        "Total rate limit checks by backend and outcome"
    );
    describe_counter!(
        names::SITES_SUBMITTED_TOTAL,
        "Total sites accepted into the catalog"
    );
    describe_counter!(
        names::POSTS_CREATED_TOTAL,
        "Total blog posts published via the API"
    );
    describe_counter!(
        names::ENRICHMENT_RUNS_TOTAL,
        "Total enrichment runs triggered"
    );
    describe_counter!(
        names::SITES_ENRICHED_TOTAL,
        "Total sites promoted to enriched"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record an HMAC authentication failure.
pub fn record_auth_failure(reason: &str) {
    counter!(names::AUTH_FAILURES_TOTAL, "reason" => reason.to_string()).increment(1);
}

/// Record a rate limit verdict.
pub fn record_rate_limit_check(backend: &str, allowed: bool) {
    let outcome = if allowed { "allowed" } else { "denied" };
    counter!(names::RATE_LIMIT_CHECKS_TOTAL, "backend" => backend.to_string(), "outcome" => outcome)
        .increment(1);
}

/// Record an accepted site submission.
pub fn record_site_submitted() {
    counter!(names::SITES_SUBMITTED_TOTAL).increment(1);
}

/// Record a published blog post.
pub fn record_post_created() {
    counter!(names::POSTS_CREATED_TOTAL).increment(1);
}

/// Record an enrichment run and how many sites it promoted.
pub fn record_enrichment_run(enriched: u64) {
    counter!(names::ENRICHMENT_RUNS_TOTAL).increment(1);
    counter!(names::SITES_ENRICHED_TOTAL).increment(enriched);
}
