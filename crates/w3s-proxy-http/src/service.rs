//! The main gateway service implementing hyper's `Service` trait.
//!
//! [`ProxyService`] is the per-request entry point: it classifies the
//! request by method, resolves the per-request context, runs the matching
//! pipeline, and guarantees that any failure — returned error or runtime
//! fault — leaves as a bounded 400 response. Expected errors travel as
//! [`ProxyError`] values through the pipelines; panics are caught exactly
//! once, here.

use std::convert::Infallible;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;
use hyper::body::Incoming;
use hyper::service::Service;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use w3s_proxy_core::{OperationKind, ProxyConfig, ProxyError, RequestContext};

use crate::backend::{ContentFetcher, StorageBackend};
use crate::body::ProxyResponseBody;
use crate::fetch::handle_fetch;
use crate::response::error_to_response;
use crate::upload::handle_upload;

/// The gateway HTTP service.
///
/// One instance serves all connections; every `call` derives its own
/// request context and artifact, so no state is shared between concurrent
/// requests beyond the read-only configuration and the two capabilities.
#[derive(Debug)]
pub struct ProxyService<S, F> {
    config: Arc<ProxyConfig>,
    backend: Arc<S>,
    fetcher: Arc<F>,
}

impl<S, F> ProxyService<S, F> {
    /// Create the service from the process configuration and the two
    /// outbound capabilities.
    #[must_use]
    pub fn new(config: Arc<ProxyConfig>, backend: S, fetcher: F) -> Self {
        Self {
            config,
            backend: Arc::new(backend),
            fetcher: Arc::new(fetcher),
        }
    }
}

impl<S, F> Clone for ProxyService<S, F> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            backend: Arc::clone(&self.backend),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<S, F> Service<http::Request<Incoming>> for ProxyService<S, F>
where
    S: StorageBackend,
    F: ContentFetcher,
{
    type Response = http::Response<ProxyResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move {
            let response = serve_request(
                &service.config,
                service.backend.as_ref(),
                service.fetcher.as_ref(),
                req,
            )
            .await;
            Ok(response)
        })
    }
}

/// Serve one request inside the fault boundary.
///
/// Pipeline errors become a 400 here; a panic anywhere in the handling
/// region is caught and becomes the same bounded 400, so a single request
/// can never take the serving task down.
pub async fn serve_request<S, F, B>(
    config: &ProxyConfig,
    backend: &S,
    fetcher: &F,
    req: http::Request<B>,
) -> http::Response<ProxyResponseBody>
where
    S: StorageBackend,
    F: ContentFetcher,
    B: http_body::Body + Send,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let request_id = Uuid::new_v4().to_string();

    match AssertUnwindSafe(process_request(config, backend, fetcher, req, &request_id))
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(panic) => {
            let fault = ProxyError::Fault(panic_message(panic.as_ref()));
            error!(error = %fault, request_id, "request handler panicked");
            error_to_response(&fault)
        }
    }
}

/// Classify and dispatch one request to the matching pipeline.
async fn process_request<S, F, B>(
    config: &ProxyConfig,
    backend: &S,
    fetcher: &F,
    req: http::Request<B>,
    request_id: &str,
) -> http::Response<ProxyResponseBody>
where
    S: StorageBackend,
    F: ContentFetcher,
    B: http_body::Body + Send,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let uri = req.uri().clone();
    debug!(%method, %uri, request_id, "processing request");

    match OperationKind::classify(&method) {
        OperationKind::Fetch => match handle_fetch(fetcher, uri.path()).await {
            Ok(response) => {
                info!(path = %uri.path(), request_id, "served fetch");
                response
            }
            Err(err) => {
                warn!(path = %uri.path(), error = %err, request_id, "fetch failed");
                error_to_response(&err)
            }
        },
        OperationKind::Upload => {
            // Reject a declared oversize before touching the body.
            if let Some(declared) = declared_length(req.headers()) {
                if declared > config.max_body_size {
                    let err = ProxyError::BodyTooLarge {
                        limit: config.max_body_size,
                    };
                    warn!(declared, error = %err, request_id, "upload rejected");
                    return error_to_response(&err);
                }
            }

            let ctx = RequestContext::resolve(config, req.headers(), uri.query());
            match handle_upload(backend, config, &ctx, req.into_body()).await {
                Ok(response) => {
                    info!(endpoint = %ctx.endpoint, request_id, "served upload");
                    response
                }
                Err(err) => {
                    warn!(endpoint = %ctx.endpoint, error = %err, request_id, "upload failed");
                    error_to_response(&err)
                }
            }
        }
    }
}

/// The declared `Content-Length`, if present and parseable.
fn declared_length(headers: &http::HeaderMap) -> Option<u64> {
    headers
        .get(http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Extract a readable message from a panic payload.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unidentified panic".to_owned()
    }
}
