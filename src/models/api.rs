use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PostStatus, Site};

/// Request to submit a site to the directory.
#[derive(Debug, Deserialize)]
pub struct SubmitSiteRequest {
    /// Display name for the listing
    pub name: String,
    /// Site URL; the catalog slug is derived from its host
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response after a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitSiteResponse {
    pub success: bool,
    pub slug: String,
}

/// Catalog listing response.
#[derive(Debug, Serialize)]
pub struct ListSitesResponse {
    pub sites: Vec<Site>,
    pub count: usize,
}

/// Optional body for POST enrichment triggers.
#[derive(Debug, Default, Deserialize)]
pub struct EnrichRequest {
    /// Cap on sites processed this run; clamped to the configured batch
    /// limit
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Result of an enrichment run.
#[derive(Debug, Serialize)]
pub struct EnrichResponse {
    pub success: bool,
    pub enriched: usize,
    pub failed: usize,
    pub total: usize,
    pub duration_ms: u64,
}

/// Request to publish a blog post.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Response after creating a post.
#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub success: bool,
    pub data: CreatedPost,
}

#[derive(Debug, Serialize)]
pub struct CreatedPost {
    pub post_id: Uuid,
    pub slug: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub redis_connected: bool,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Service statistics response.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub sites_total: usize,
    pub sites_pending: usize,
    pub sites_enriched: usize,
    pub posts_total: usize,
    pub uptime_seconds: u64,
}
