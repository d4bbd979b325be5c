//! Shared helpers for handlers.

use axum::http::{HeaderMap, header};
use tracing::warn;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::security::{
    SignatureParams, VerifyError, VerifyOptions, extract_signature, verify_signature,
};

/// Header carrying the client's signing timestamp (epoch milliseconds).
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Authenticate a machine-to-machine request via its HMAC headers.
///
/// `body` must be the raw request payload, byte-for-byte as received;
/// verification runs before any JSON parsing so a tampered body never
/// reaches a deserializer.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` (HTTP 401) for a missing or malformed
/// `Authorization` header, a missing or non-numeric `X-Timestamp`, or a
/// failed signature verification. The message names the failed check; it
/// never includes secret material.
pub fn verify_hmac_request(
    config: &Config,
    method: &str,
    path: &str,
    headers: &HeaderMap,
    body: &str,
) -> AppResult<()> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(signature) = extract_signature(auth_header) else {
        warn!(path = %path, "Missing or invalid Authorization header");
        metrics::record_auth_failure("missing_signature");
        return Err(AppError::Unauthorized(
            r#"Missing or invalid Authorization header. Expected: "HMAC <signature>""#.to_string(),
        ));
    };

    // Non-numeric timestamps are rejected here, before verification.
    let timestamp = headers
        .get(TIMESTAMP_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok());

    let Some(timestamp) = timestamp else {
        warn!(path = %path, "Missing or invalid X-Timestamp header");
        metrics::record_auth_failure("bad_timestamp");
        return Err(AppError::Unauthorized(
            "Missing or invalid X-Timestamp header".to_string(),
        ));
    };

    let params = SignatureParams {
        method,
        path,
        timestamp,
        body,
    };

    verify_signature(
        signature,
        &params,
        &config.hmac_secret,
        VerifyOptions::with_max_age(config.hmac_max_age),
    )
    .map_err(|e| {
        warn!(path = %path, error = %e, "HMAC verification failed");
        metrics::record_auth_failure(match &e {
            VerifyError::Expired { .. } => "expired",
            VerifyError::FutureTimestamp => "future_timestamp",
            VerifyError::InvalidSignature => "invalid_signature",
        });
        AppError::Unauthorized(format!("Authentication failed: {e}"))
    })
}
