//! Blog publishing API.
//!
//! `POST /api/blogs` creates posts on behalf of trusted automation. The
//! endpoint bypasses interactive admin authentication because it is
//! secured by the HMAC signature over the raw body; JSON parsing happens
//! strictly after verification succeeds.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use tracing::{info, instrument};

use super::util::verify_hmac_request;
use crate::error::AppResult;
use crate::models::{CreatePostRequest, CreatePostResponse, CreatedPost};
use crate::state::AppState;

/// Publish a blog post.
///
/// Expected headers:
/// - `Authorization: HMAC <signature>`
/// - `X-Timestamp: <epoch-millis>`
///
/// Body: [`CreatePostRequest`] as JSON, exactly the bytes that were
/// signed. Duplicate slugs are a 409 conflict.
#[instrument(skip(state, headers, body))]
pub async fn create_post(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> AppResult<(StatusCode, Json<CreatePostResponse>)> {
    verify_hmac_request(&state.config, method.as_str(), uri.path(), &headers, &body)?;

    info!("Request authenticated via HMAC signature");

    let request: CreatePostRequest = serde_json::from_str(&body)?;
    let post = state.catalog.create_post(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            success: true,
            data: CreatedPost {
                post_id: post.id,
                slug: post.slug,
            },
        }),
    ))
}
