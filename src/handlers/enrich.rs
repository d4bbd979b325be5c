//! Manual enrichment endpoint (formerly cron-based).
//!
//! `GET|POST /api/enrich` runs a metrics pass over pending listings. The
//! endpoint is machine-to-machine only, authenticated by HMAC signature
//! with replay protection; there is no session fallback. POST bodies are
//! part of the signed canonical string, so the handler buffers the raw
//! body before anything parses it.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use tracing::{info, instrument};

use super::util::verify_hmac_request;
use crate::error::AppResult;
use crate::models::{EnrichRequest, EnrichResponse};
use crate::state::AppState;

/// Trigger an enrichment run over pending sites.
///
/// An optional JSON body (`{"limit": n}`) caps the batch; the cap is
/// clamped to the configured `ENRICH_BATCH_LIMIT`. GET requests sign an
/// empty body.
#[instrument(skip(state, headers, body))]
pub async fn trigger_enrichment(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> AppResult<Json<EnrichResponse>> {
    verify_hmac_request(&state.config, method.as_str(), uri.path(), &headers, &body)?;

    info!("Starting manual enrichment (API trigger)");

    let request: EnrichRequest = if body.is_empty() {
        EnrichRequest::default()
    } else {
        serde_json::from_str(&body)?
    };

    let batch_limit = state.config.enrich_batch_limit;
    let limit = request.limit.unwrap_or(batch_limit).min(batch_limit);

    let stats = state.catalog.run_enrichment(limit).await;

    Ok(Json(EnrichResponse {
        success: true,
        enriched: stats.enriched,
        failed: stats.failed,
        total: stats.total,
        duration_ms: stats.duration_ms,
    }))
}
