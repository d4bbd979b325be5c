mod api;
mod post;
mod site;

pub use api::{
    CreatePostRequest, CreatePostResponse, CreatedPost, EnrichRequest, EnrichResponse,
    HealthResponse, ListSitesResponse, StatsResponse, SubmitSiteRequest, SubmitSiteResponse,
};
pub use post::{BlogPost, PostStatus};
pub use site::{Site, SiteStatus};
