//! HTTP middleware and request-level helpers.
//!
//! - **Request ID**: generation and propagation for log correlation
//! - **Client IP**: header-priority extraction for rate-limit keying
//!
//! Authentication and rate limiting intentionally do not live here as
//! layers: HMAC verification needs the buffered request body and rate
//! limits differ per call site, so handlers invoke both directly (see
//! `handlers::util` and `ratelimit::RateLimiterRegistry`).

pub mod ip;
pub mod request_id;

pub use ip::{UNKNOWN_IP, extract_client_ip};
pub use request_id::{RequestIdExt, RequestIdLayer};
