mod blogs;
mod enrich;
mod health;
mod sites;
pub mod util;

pub use blogs::create_post;
pub use enrich::trigger_enrichment;
pub use health::{health_check, readiness_check, stats};
pub use sites::{get_site, list_sites, submit_site};
