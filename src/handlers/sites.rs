//! Public catalog endpoints.
//!
//! Submission is the one write path open to anonymous visitors, so it is
//! the rate-limited surface: the handler resolves the client IP, asks the
//! registry for a verdict, and only then touches the catalog. Admins and
//! machine clients use the HMAC endpoints instead and are not limited
//! here.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::error::{AppError, AppResult};
use crate::middleware::extract_client_ip;
use crate::models::{ListSitesResponse, Site, SiteStatus, SubmitSiteRequest, SubmitSiteResponse};
use crate::state::AppState;

/// Query parameters for listing sites.
#[derive(Debug, Deserialize)]
pub struct ListSitesQuery {
    /// Optional status filter: `pending` or `enriched`
    pub status: Option<String>,
}

/// Submit a site to the directory.
///
/// Rate limited per client IP with the configured submission budget
/// (default 30 per day). A denial is surfaced as 429 with a `Retry-After`
/// hint.
#[instrument(skip(state, headers, request))]
pub async fn submit_site(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SubmitSiteRequest>,
) -> AppResult<(StatusCode, Json<SubmitSiteResponse>)> {
    let client_ip = extract_client_ip(&headers);
    let limit = &state.config.submit_limit;

    let allowed = state
        .registry
        .check(&client_ip, limit, state.config.fallback_mode)
        .await;

    if !allowed {
        warn!(client_ip = %client_ip, "Submission rate limit exceeded");
        return Err(AppError::RateLimited {
            message: format!(
                "Rate limit exceeded. You can submit up to {} sites per {}.",
                limit.max_requests, limit.window
            ),
            retry_after_secs: limit.window.duration().as_secs(),
        });
    }

    let site = state.catalog.submit_site(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitSiteResponse {
            success: true,
            slug: site.slug,
        }),
    ))
}

/// List catalog entries, optionally filtered by status.
#[instrument(skip(state))]
pub async fn list_sites(
    State(state): State<AppState>,
    Query(query): Query<ListSitesQuery>,
) -> AppResult<Json<ListSitesResponse>> {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => Some(SiteStatus::parse(raw).ok_or_else(|| {
            AppError::BadRequest(format!("unknown status '{raw}': use pending or enriched"))
        })?),
    };

    let sites = state.catalog.list_sites(status).await;

    Ok(Json(ListSitesResponse {
        count: sites.len(),
        sites,
    }))
}

/// Fetch a single listing by slug.
#[instrument(skip(state))]
pub async fn get_site(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Site>> {
    state
        .catalog
        .get_site(&slug)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("site '{slug}' not found")))
}
