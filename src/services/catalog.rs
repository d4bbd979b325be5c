//! In-memory catalog of submitted sites and published posts.
//!
//! This service is the seam where a relational database would sit in a
//! full deployment; the API layer only ever talks to it through these
//! methods, so swapping the store does not touch the handlers. Submissions
//! arrive as `pending` and the enrichment pass promotes them to
//! `enriched`; the metric sources themselves (domain rank, traffic) are
//! external collaborators and out of scope here.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{BlogPost, CreatePostRequest, Site, SiteStatus, SubmitSiteRequest};
use crate::validation;

/// Counts from one enrichment run.
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentStats {
    pub enriched: usize,
    pub failed: usize,
    pub total: usize,
    pub duration_ms: u64,
}

/// Catalog-wide counts for the stats endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogStats {
    pub sites_total: usize,
    pub sites_pending: usize,
    pub sites_enriched: usize,
    pub posts_total: usize,
}

/// Shared catalog state, keyed by slug.
#[derive(Default)]
pub struct CatalogService {
    sites: RwLock<HashMap<String, Site>>,
    posts: RwLock<HashMap<String, BlogPost>>,
}

impl CatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a submitted site as a pending listing.
    ///
    /// The slug is derived from the URL host, so re-submitting the same
    /// site is a conflict rather than a duplicate listing.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn submit_site(&self, request: SubmitSiteRequest) -> AppResult<Site> {
        validation::validate_name(&request.name, "name")?;
        validation::validate_url(&request.url)?;

        let slug = validation::slug_from_url(&request.url)
            .ok_or_else(|| AppError::BadRequest("url must include a host".to_string()))?;

        let mut sites = self.sites.write().await;
        if sites.contains_key(&slug) {
            return Err(AppError::Conflict(format!(
                "Site '{slug}' has already been submitted"
            )));
        }

        let site = Site {
            id: Uuid::new_v4(),
            slug: slug.clone(),
            name: request.name.trim().to_string(),
            url: request.url,
            description: request.description.filter(|d| !d.trim().is_empty()),
            status: SiteStatus::Pending,
            submitted_at: Utc::now(),
            enriched_at: None,
        };

        sites.insert(slug.clone(), site.clone());
        drop(sites);

        info!(slug = %slug, "Site submitted");
        metrics::record_site_submitted();

        Ok(site)
    }

    /// Look up a listing by slug.
    pub async fn get_site(&self, slug: &str) -> Option<Site> {
        self.sites.read().await.get(slug).cloned()
    }

    /// List catalog entries, optionally filtered by status, newest first.
    pub async fn list_sites(&self, status: Option<SiteStatus>) -> Vec<Site> {
        let sites = self.sites.read().await;
        let mut result: Vec<Site> = sites
            .values()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect();

        result.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        result
    }

    /// Promote up to `limit` pending listings to enriched.
    ///
    /// Oldest submissions go first so nothing starves behind a steady
    /// stream of new entries.
    #[instrument(skip(self))]
    pub async fn run_enrichment(&self, limit: usize) -> EnrichmentStats {
        let started = Instant::now();
        let mut sites = self.sites.write().await;

        let mut pending_slugs: Vec<(String, chrono::DateTime<Utc>)> = sites
            .values()
            .filter(|s| s.status == SiteStatus::Pending)
            .map(|s| (s.slug.clone(), s.submitted_at))
            .collect();
        pending_slugs.sort_by(|a, b| a.1.cmp(&b.1));

        let mut enriched = 0usize;
        for (slug, _) in pending_slugs.into_iter().take(limit) {
            if let Some(site) = sites.get_mut(&slug) {
                site.status = SiteStatus::Enriched;
                site.enriched_at = Some(Utc::now());
                enriched += 1;
            }
        }
        drop(sites);

        let stats = EnrichmentStats {
            enriched,
            failed: 0,
            total: enriched,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            enriched = stats.enriched,
            total = stats.total,
            duration_ms = stats.duration_ms,
            "Enrichment run complete"
        );
        metrics::record_enrichment_run(stats.enriched as u64);

        stats
    }

    /// Publish a blog post.
    #[instrument(skip(self, request), fields(slug = %request.slug))]
    pub async fn create_post(&self, request: CreatePostRequest) -> AppResult<BlogPost> {
        validation::validate_title(&request.title)?;
        validation::validate_slug(&request.slug)?;

        let mut posts = self.posts.write().await;
        if posts.contains_key(&request.slug) {
            return Err(AppError::Conflict(format!(
                "Slug '{}' already exists",
                request.slug
            )));
        }

        let post = BlogPost {
            id: Uuid::new_v4(),
            slug: request.slug.clone(),
            title: request.title,
            content: request.content.filter(|c| !c.is_empty()),
            description: request.description.filter(|d| !d.is_empty()),
            status: request.status,
            is_pinned: request.is_pinned,
            tags: request.tags,
            created_at: Utc::now(),
        };

        posts.insert(post.slug.clone(), post.clone());
        drop(posts);

        info!(slug = %post.slug, status = ?post.status, "Post created");
        metrics::record_post_created();

        Ok(post)
    }

    /// Current catalog counts.
    pub async fn stats(&self) -> CatalogStats {
        let sites = self.sites.read().await;
        let posts = self.posts.read().await;

        let sites_pending = sites
            .values()
            .filter(|s| s.status == SiteStatus::Pending)
            .count();

        CatalogStats {
            sites_total: sites.len(),
            sites_pending,
            sites_enriched: sites.len() - sites_pending,
            posts_total: posts.len(),
        }
    }
}
