//! Domain services backing the HTTP handlers.

mod catalog;

pub use catalog::{CatalogService, CatalogStats, EnrichmentStats};
