//! The upload pipeline: capture the request body and hand it to the
//! storage backend.
//!
//! Steps, strictly sequential: allocate the in-memory artifact, drain the
//! body into it (bounded by the size limit and the read timeout), invoke
//! the backend, render `<cid>/<filename>`. The artifact is released on
//! every exit path.

use std::io::Write;

use bytes::Buf;
use http_body_util::{BodyExt, Limited};
use tracing::debug;

use w3s_proxy_core::{MemFile, ProxyConfig, ProxyError, ProxyResult, RequestContext};

use crate::backend::StorageBackend;
use crate::body::ProxyResponseBody;

/// Fixed stem of every uploaded artifact's name; the classifier's extension
/// is appended.
pub const FILE_STEM: &str = "w3s-proxy";

/// Run the upload pipeline for one request.
pub async fn handle_upload<S, B>(
    backend: &S,
    config: &ProxyConfig,
    ctx: &RequestContext,
    body: B,
) -> ProxyResult<http::Response<ProxyResponseBody>>
where
    S: StorageBackend,
    B: http_body::Body + Send,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut file = MemFile::new(format!("{FILE_STEM}{}", ctx.extension));
    let result = run_pipeline(backend, config, ctx, &mut file, body).await;
    file.close();
    result
}

/// The fallible portion of the pipeline; the caller releases the artifact.
async fn run_pipeline<S, B>(
    backend: &S,
    config: &ProxyConfig,
    ctx: &RequestContext,
    file: &mut MemFile,
    body: B,
) -> ProxyResult<http::Response<ProxyResponseBody>>
where
    S: StorageBackend,
    B: http_body::Body + Send,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    drain_body(file, body, config).await?;
    debug!(name = %file.name(), size = file.len(), endpoint = %ctx.endpoint, "artifact captured");

    let cid = backend.put(ctx, file).await?;

    let result = format!("{cid}/{}", file.name());
    http::Response::builder()
        .status(http::StatusCode::OK)
        .body(ProxyResponseBody::from_string(result))
        .map_err(|e| ProxyError::Internal(e.to_string()))
}

/// Drain the request body into the artifact, frame by frame, bounded by the
/// configured size limit and read timeout.
async fn drain_body<B>(file: &mut MemFile, body: B, config: &ProxyConfig) -> ProxyResult<()>
where
    B: http_body::Body + Send,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(config.max_body_size).unwrap_or(usize::MAX);
    let limited = Limited::new(body, limit);

    tokio::time::timeout(config.body_read_timeout, write_frames(file, limited))
        .await
        .map_err(|_| ProxyError::BodyTimeout {
            seconds: config.body_read_timeout.as_secs(),
        })?
        .map_err(|e| {
            if e.downcast_ref::<http_body_util::LengthLimitError>().is_some() {
                ProxyError::BodyTooLarge {
                    limit: config.max_body_size,
                }
            } else {
                ProxyError::BodyRead(e.to_string())
            }
        })
}

/// Append every data frame of the body to the artifact.
async fn write_frames<B>(
    file: &mut MemFile,
    body: B,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    B: http_body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut body = std::pin::pin!(body);
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(Into::into)?;
        if let Ok(mut data) = frame.into_data() {
            while data.has_remaining() {
                let chunk = data.chunk();
                file.write_all(chunk)?;
                let advanced = chunk.len();
                data.advance(advanced);
            }
        }
    }
    Ok(())
}
