//! Request ID middleware.
//!
//! Propagates an incoming `X-Request-Id` header or generates a UUIDv4 when
//! none is present, makes the ID visible to handlers via the request
//! headers, and echoes it on the response so clients can correlate logs.

use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::HeaderValue;
use axum::http::{Request, Response};
use tower::{Layer, Service};
use tracing::debug;
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID layer for the Tower middleware stack.
#[derive(Clone, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service wrapper adding the request ID to request and response.
#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let request_id = extract_or_generate_request_id(&req);
        let header_value = HeaderValue::from_str(&request_id)
            .unwrap_or_else(|_| HeaderValue::from_static("unknown"));

        req.headers_mut()
            .insert(REQUEST_ID_HEADER, header_value.clone());
        debug!(request_id = %request_id, "Processing request");

        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
            Ok(response)
        })
    }
}

/// Reuse the client-supplied ID when present, otherwise mint a UUIDv4.
fn extract_or_generate_request_id<B>(req: &Request<B>) -> String {
    if let Some(value) = req.headers().get(REQUEST_ID_HEADER)
        && let Ok(id) = value.to_str()
        && !id.is_empty()
    {
        return id.to_string();
    }

    Uuid::new_v4().to_string()
}

/// Extension trait so handlers can read the request ID for logging.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<String>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<String> {
        self.headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_propagates_existing_id() {
        let req = Request::builder()
            .header("x-request-id", "correlation-42")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_or_generate_request_id(&req), "correlation-42");
    }

    #[test]
    fn test_generates_uuid_when_missing() {
        let req = Request::builder().body(Body::empty()).unwrap();

        let id = extract_or_generate_request_id(&req);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_empty_header_regenerates() {
        let req = Request::builder()
            .header("x-request-id", "")
            .body(Body::empty())
            .unwrap();

        let id = extract_or_generate_request_id(&req);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_request_id_ext() {
        let req = Request::builder()
            .header("x-request-id", "abc")
            .body(Body::empty())
            .unwrap();

        assert_eq!(req.request_id(), Some("abc".to_string()));

        let bare = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(bare.request_id(), None);
    }
}
