//! Common type definitions shared across the gateway crates.

use std::fmt;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;

use crate::ProxyError;

/// A single-pass stream of body bytes produced by the content gateway.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Opaque content identifier issued by the storage backend.
///
/// The gateway never inspects the identifier beyond requiring it to be
/// non-empty; it is produced by a successful upload and echoed back to the
/// client as the first path segment of the response body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Cid(String);

impl Cid {
    /// Create a content identifier from the backend's string form.
    ///
    /// # Errors
    /// Returns [`ProxyError::EmptyCid`] if the value is empty or whitespace.
    pub fn new(cid: impl Into<String>) -> Result<Self, ProxyError> {
        let cid = cid.into();
        if cid.trim().is_empty() {
            return Err(ProxyError::EmptyCid);
        }
        Ok(Self(cid))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content retrieved from the public read gateway.
///
/// The body is a lazy, single-pass, non-restartable stream; the length is a
/// hint that may be absent, in which case the transport falls back to
/// chunked framing.
pub struct FetchedContent {
    /// The content type reported by the gateway, if any.
    pub content_type: Option<String>,
    /// The content length reported by the gateway, if known.
    pub content_length: Option<u64>,
    /// The body bytes, streamed as they arrive.
    pub body: ByteStream,
}

impl FetchedContent {
    /// Build fetched content from an in-memory byte buffer.
    ///
    /// The stream yields the buffer as a single chunk; the length hint is set
    /// to the buffer size. Mostly useful for tests and mocks.
    #[must_use]
    pub fn from_bytes(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let len = data.len() as u64;
        Self {
            content_type: Some(content_type.into()),
            content_length: Some(len),
            body: futures::stream::iter([Ok(data)]).boxed(),
        }
    }
}

impl fmt::Debug for FetchedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchedContent")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("body", &"...")
            .finish()
    }
}
