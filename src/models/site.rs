//! Catalog entry for a submitted website.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    /// Submitted, awaiting enrichment.
    Pending,
    /// Metrics pass completed.
    Enriched,
}

impl SiteStatus {
    /// Parse a query-string status filter.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SiteStatus::Pending),
            "enriched" => Some(SiteStatus::Enriched),
            _ => None,
        }
    }
}

/// A directory listing.
#[derive(Debug, Clone, Serialize)]
pub struct Site {
    pub id: Uuid,
    /// Derived from the URL host; unique within the catalog.
    pub slug: String,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: SiteStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enriched_at: Option<DateTime<Utc>>,
}
