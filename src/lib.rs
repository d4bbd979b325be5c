//! # Directory API
//!
//! Machine-to-machine API service for a guest-post site directory:
//! visitors submit sites into a reviewable catalog, and trusted automation
//! (an enrichment trigger, a blog-publishing client) calls signed
//! endpoints. Features:
//!
//! - **HMAC request authentication**: canonical-string HMAC-SHA256
//!   signatures with replay protection and constant-time comparison
//! - **Rate limiting with graceful degradation**: Redis sliding windows
//!   when available, per-process counters as the fallback
//! - **Observability**: request IDs, structured logging, Prometheus
//!   metrics, health endpoints
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Request ID → Trace → CORS)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (health, sites, enrich, blogs)                    │
//! │    │            │ IP + registry      │ HMAC verify          │
//! ├────┼────────────┼────────────────────┼─────────────────────┤
//! │  CatalogService │ RateLimiterRegistry│ security::hmac       │
//! │  (in-memory)    │ (Redis + fallback) │ (pure functions)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use directory_api::{AppState, Config, RateLimiterRegistry, build_router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let state = AppState::new(RateLimiterRegistry::new(None), config);
//!     let app = build_router(state);
//!
//!     // Serve the router...
//!     Ok(())
//! }
//! ```
//!
//! ## Security Configuration
//!
//! The HMAC secret is required and length-validated at startup:
//!
//! ```bash
//! HMAC_SECRET=$(openssl rand -hex 32) cargo run
//! ```
//!
//! Redis is optional; without it the rate limiter degrades to in-process
//! counters (see `ratelimit` module docs for the trade-off).

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod ratelimit;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use ratelimit::{FallbackMode, RateLimitConfig, RateLimiterRegistry, Window, WindowUnit};
pub use routes::build_router;
pub use state::AppState;
