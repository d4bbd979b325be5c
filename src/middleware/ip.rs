//! Client IP extraction.
//!
//! Shared by every collaborator that keys rate limits on the caller's
//! address. Works on the request's `HeaderMap` so both middleware and
//! handlers can use it.
//!
//! # Header Priority
//!
//! 1. `CF-Connecting-IP` - set by Cloudflare at the edge, one value.
//! 2. `X-Real-IP` - set by reverse proxies such as nginx.
//! 3. `X-Forwarded-For` - first entry of the comma-separated list (the
//!    original client; later entries are intermediate proxies).
//! 4. The literal `"unknown"` when nothing is present.
//!
//! # Security Warning: IP Spoofing Risk
//!
//! All of these headers are client-controllable unless a trusted proxy in
//! front of this service overwrites them. Deploy behind an edge that does
//! (Cloudflare, or nginx with `proxy_set_header X-Real-IP $remote_addr`)
//! and block direct access; otherwise an attacker can rotate spoofed
//! addresses to dodge per-IP limits, or frame another address. Requests
//! with no usable header all share the `"unknown"` key and are limited
//! collectively.

use std::borrow::Cow;

use axum::http::HeaderMap;

/// Fallback identifier when no client IP can be determined.
pub const UNKNOWN_IP: &str = "unknown";

/// Raw extraction result, tracking which header matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractedIp<'a> {
    FromCloudflare(&'a str),
    FromRealIp(&'a str),
    FromForwardedFor(&'a str),
    NotFound,
}

/// Core header walk. Borrows from the header map; no allocation.
fn extract_ip_from_headers(headers: &HeaderMap) -> ExtractedIp<'_> {
    if let Some(value) = headers.get("cf-connecting-ip")
        && let Ok(ip) = value.to_str()
        && !ip.trim().is_empty()
    {
        return ExtractedIp::FromCloudflare(ip.trim());
    }

    if let Some(value) = headers.get("x-real-ip")
        && let Ok(ip) = value.to_str()
        && !ip.trim().is_empty()
    {
        return ExtractedIp::FromRealIp(ip.trim());
    }

    // "client, proxy1, proxy2" - the first entry is the client.
    if let Some(value) = headers.get("x-forwarded-for")
        && let Ok(list) = value.to_str()
        && let Some(first) = list.split(',').next()
        && !first.trim().is_empty()
    {
        return ExtractedIp::FromForwardedFor(first.trim());
    }

    ExtractedIp::NotFound
}

/// Extract the client IP for rate-limit keying.
///
/// Returns `Cow::Borrowed(UNKNOWN_IP)` (no allocation) when no header
/// matches, an owned string otherwise.
pub fn extract_client_ip(headers: &HeaderMap) -> Cow<'static, str> {
    match extract_ip_from_headers(headers) {
        ExtractedIp::FromCloudflare(ip)
        | ExtractedIp::FromRealIp(ip)
        | ExtractedIp::FromForwardedFor(ip) => Cow::Owned(ip.to_string()),
        ExtractedIp::NotFound => Cow::Borrowed(UNKNOWN_IP),
    }
}
