//! The fetch pipeline: stream stored content back to the client.
//!
//! The raw request path is the content identifier. The response carries the
//! content type exactly as the fetcher reported it and declares the length
//! when known; bytes flow backend-to-client as they arrive, with no
//! intermediate buffering.

use tracing::debug;

use w3s_proxy_core::{ProxyError, ProxyResult};

use crate::backend::ContentFetcher;
use crate::body::ProxyResponseBody;

/// Run the fetch pipeline for one request.
pub async fn handle_fetch<F>(
    fetcher: &F,
    path: &str,
) -> ProxyResult<http::Response<ProxyResponseBody>>
where
    F: ContentFetcher,
{
    let content = fetcher.fetch(path).await?;
    debug!(
        path,
        content_type = ?content.content_type,
        content_length = ?content.content_length,
        "streaming fetched content"
    );

    let mut builder = http::Response::builder().status(http::StatusCode::OK);
    if let Some(content_type) = &content.content_type {
        builder = builder.header(http::header::CONTENT_TYPE, content_type.as_str());
    }
    if let Some(length) = content.content_length {
        builder = builder.header(http::header::CONTENT_LENGTH, length);
    }

    builder
        .body(ProxyResponseBody::streaming(
            content.body,
            content.content_length,
        ))
        .map_err(|e| ProxyError::Internal(e.to_string()))
}
