//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (applied in order)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │   Request ID     │ ← Adds X-Request-Id header
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response logging
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │      CORS        │ ← Cross-origin headers
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler         ← HMAC auth / rate limiting happen here, per endpoint
//! ```
//!
//! Authentication and rate limiting are handler concerns rather than
//! global layers: HMAC signatures cover the raw body, and each rate limit
//! has its own prefix and budget.
//!
//! # Route Groups
//!
//! - `/health`, `/ready`, `/stats` - Monitoring (open)
//! - `/api/sites` - Public catalog: submission (IP rate-limited) and reads
//! - `/api/enrich`, `/api/blogs` - Machine-to-machine (HMAC)

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::RequestIdLayer;
use crate::state::AppState;

/// Build the application router with all routes and middleware configured.
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    let cors = build_cors_layer(&config.cors_allowed_origins);

    let mut router = Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/stats", get(handlers::stats))
        // Public catalog
        .route(
            "/api/sites",
            get(handlers::list_sites).post(handlers::submit_site),
        )
        .route("/api/sites/{slug}", get(handlers::get_site))
        // Machine-to-machine endpoints (HMAC authenticated)
        .route(
            "/api/enrich",
            get(handlers::trigger_enrichment).post(handlers::trigger_enrichment),
        )
        .route("/api/blogs", post(handlers::create_post));

    // Layers run bottom to top for requests.
    info!(
        max_size_kb = config.max_request_body_size / 1024,
        "Request body size limit configured"
    );
    router = router.layer(DefaultBodyLimit::max(config.max_request_body_size));
    router = router.layer(cors);
    router = router.layer(TraceLayer::new_for_http());
    router = router.layer(RequestIdLayer::new());

    router.with_state(state)
}

/// Build CORS layer from configuration.
///
/// `*` allows any origin; convenient for development, avoid in
/// production.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_any = allowed_origins.iter().any(|o| o == "*");

    if allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cors_layer_any() {
        let origins = vec!["*".to_string()];
        let _layer = build_cors_layer(&origins);
    }

    #[test]
    fn test_build_cors_layer_specific() {
        let origins = vec![
            "https://dobacklinks.com".to_string(),
            "https://admin.dobacklinks.com".to_string(),
        ];
        let _layer = build_cors_layer(&origins);
    }
}
