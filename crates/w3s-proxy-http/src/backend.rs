//! Capability traits between the HTTP layer and the outbound clients.
//!
//! The pipelines depend only on these seams; the server binary wires in the
//! real clients, and tests substitute in-process mocks.

use async_trait::async_trait;

use w3s_proxy_core::{Cid, FetchedContent, MemFile, ProxyResult, RequestContext};

/// Storage capability: persist one artifact and return its content
/// identifier.
///
/// Implementations construct their client from the per-request
/// [`RequestContext`] — endpoint and credential resolution has already
/// happened — and must not retain the artifact beyond the call.
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Store the artifact and return the backend-issued identifier.
    async fn put(&self, ctx: &RequestContext, file: &mut MemFile) -> ProxyResult<Cid>;
}

/// Retrieval capability: resolve a content identifier path into a typed
/// byte stream.
#[async_trait]
pub trait ContentFetcher: Send + Sync + 'static {
    /// Fetch the content stored under the given identifier path.
    async fn fetch(&self, path: &str) -> ProxyResult<FetchedContent>;
}
