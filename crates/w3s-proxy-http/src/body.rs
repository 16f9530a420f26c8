//! Response body types supporting buffered, empty, and streaming modes.
//!
//! [`ProxyResponseBody`] is the HTTP response body used throughout the
//! gateway:
//!
//! - **Buffered**: small responses — the `<cid>/<filename>` upload result
//!   and error bodies.
//! - **Empty**: responses with no body content.
//! - **Streaming**: fetched content passed through backend-to-client as it
//!   arrives, with an optional length hint; without the hint the transport
//!   falls back to chunked framing.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::TryStreamExt;
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};

use w3s_proxy_core::ByteStream;

/// Gateway response body.
///
/// Implements [`http_body::Body`] so it can be used directly with hyper
/// responses.
#[derive(Debug, Default)]
pub enum ProxyResponseBody {
    /// Buffered body for small responses.
    Buffered(Full<Bytes>),
    /// Empty body.
    #[default]
    Empty,
    /// Single-pass streamed body with an optional known length.
    Streaming {
        /// The streamed frames.
        body: UnsyncBoxBody<Bytes, std::io::Error>,
        /// Length hint; `None` means chunked framing.
        length: Option<u64>,
    },
}

impl ProxyResponseBody {
    /// Create a buffered body from bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(data.into()))
    }

    /// Create a buffered body from a UTF-8 string.
    #[must_use]
    pub fn from_string(s: impl Into<String>) -> Self {
        Self::Buffered(Full::new(Bytes::from(s.into())))
    }

    /// Create an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Create a streaming body from a byte stream and an optional length
    /// hint.
    #[must_use]
    pub fn streaming(stream: ByteStream, length: Option<u64>) -> Self {
        Self::Streaming {
            body: StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync(),
            length,
        }
    }
}

impl http_body::Body for ProxyResponseBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Buffered(full) => Pin::new(full)
                .poll_frame(cx)
                .map_err(|never| match never {}),
            Self::Empty => Poll::Ready(None),
            Self::Streaming { body, .. } => Pin::new(body).poll_frame(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Buffered(full) => full.is_end_stream(),
            Self::Empty => true,
            Self::Streaming { body, .. } => body.is_end_stream(),
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Buffered(full) => full.size_hint(),
            Self::Empty => http_body::SizeHint::with_exact(0),
            Self::Streaming { length, .. } => {
                length.map_or_else(http_body::SizeHint::default, http_body::SizeHint::with_exact)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use http_body::Body;

    use super::*;

    #[test]
    fn test_should_report_empty_body_as_end_of_stream() {
        let body = ProxyResponseBody::empty();
        assert!(body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(0));
    }

    #[test]
    fn test_should_create_buffered_body_from_string() {
        let body = ProxyResponseBody::from_string("bafy123/w3s-proxy.txt");
        assert!(!body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(21));
    }

    #[test]
    fn test_should_default_to_empty() {
        let body = ProxyResponseBody::default();
        assert!(body.is_end_stream());
    }

    #[tokio::test]
    async fn test_should_stream_chunks_in_order() {
        let chunks: Vec<std::io::Result<Bytes>> =
            vec![Ok(Bytes::from("ab")), Ok(Bytes::from("cd"))];
        let body =
            ProxyResponseBody::streaming(futures::stream::iter(chunks).boxed(), Some(4));
        assert_eq!(body.size_hint().exact(), Some(4));

        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected.as_ref(), b"abcd");
    }

    #[test]
    fn test_should_leave_length_open_without_hint() {
        let body = ProxyResponseBody::streaming(futures::stream::empty().boxed(), None);
        assert_eq!(body.size_hint().exact(), None);
    }
}
