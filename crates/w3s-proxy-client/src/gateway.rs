//! Content fetcher for the public read gateway.

use std::io;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Url;
use tracing::debug;

use w3s_proxy_core::{ByteStream, FetchedContent, ProxyError, ProxyResult};

/// Client for the public read gateway.
///
/// Built once at startup and shared across fetch requests; the gateway URL
/// is fixed process-wide, unlike the per-request storage endpoint.
#[derive(Debug, Clone)]
pub struct GatewayFetcher {
    http: reqwest::Client,
    base: Url,
    chunk_timeout: Duration,
}

impl GatewayFetcher {
    /// Create a fetcher for the given gateway base URL.
    ///
    /// `chunk_timeout` bounds how long the stream may stall between chunks
    /// before the transfer is aborted.
    ///
    /// # Errors
    /// Returns [`ProxyError::InvalidEndpoint`] if the base URL does not
    /// parse.
    pub fn new(base: &str, chunk_timeout: Duration) -> ProxyResult<Self> {
        let base = Url::parse(base).map_err(|e| ProxyError::InvalidEndpoint {
            endpoint: base.to_owned(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ProxyError::Gateway(e.to_string()))?;

        Ok(Self {
            http,
            base,
            chunk_timeout,
        })
    }

    /// Fetch stored content by identifier path.
    ///
    /// The body is returned as a single-pass stream; bytes flow from the
    /// gateway as they arrive, with no intermediate buffering. A non-2xx
    /// gateway status is an error, not a pass-through.
    pub async fn fetch(&self, path: &str) -> ProxyResult<FetchedContent> {
        let url = format!(
            "{}/ipfs/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        debug!(%url, "fetching content");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProxyError::Gateway(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::GatewayStatus {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let content_length = response.content_length();
        let body = stall_guarded(response.bytes_stream(), self.chunk_timeout);

        Ok(FetchedContent {
            content_type,
            content_length,
            body,
        })
    }
}

/// Adapt a reqwest byte stream into a [`ByteStream`], bounding the wait for
/// each chunk.
///
/// A stalled upstream otherwise keeps the client connection open forever;
/// the guard turns the stall into an I/O error that tears the transfer down.
fn stall_guarded<S>(stream: S, chunk_timeout: Duration) -> ByteStream
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    Box::pin(async_stream::try_stream! {
        futures::pin_mut!(stream);
        loop {
            let next = tokio::time::timeout(chunk_timeout, stream.next())
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "upstream stalled"))?;
            match next {
                Some(chunk) => {
                    let chunk = chunk.map_err(io::Error::other)?;
                    yield chunk;
                }
                None => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;
    use crate::test_support::serve_once;

    /// Generous bound for canned local responses.
    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_should_reject_malformed_base_url() {
        let err = GatewayFetcher::new("not a url", TIMEOUT).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidEndpoint { .. }));
    }

    #[tokio::test]
    async fn test_should_fetch_content_with_type_and_length() {
        let (addr, recorded) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 10\r\nConnection: close\r\n\r\n0123456789",
        )
        .await;

        let fetcher = GatewayFetcher::new(&addr, TIMEOUT).unwrap();
        let content = fetcher.fetch("/bafy123").await.unwrap();
        assert_eq!(content.content_type.as_deref(), Some("image/png"));
        assert_eq!(content.content_length, Some(10));

        let chunks: Vec<Bytes> = content.body.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"0123456789");

        let request = recorded.await.unwrap();
        assert!(request.head.starts_with("GET /ipfs/bafy123 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_should_error_on_upstream_failure_status() {
        let (addr, _recorded) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let fetcher = GatewayFetcher::new(&addr, TIMEOUT).unwrap();
        let err = fetcher.fetch("/missing").await.unwrap_err();
        assert!(matches!(err, ProxyError::GatewayStatus { status: 404 }));
    }
}
