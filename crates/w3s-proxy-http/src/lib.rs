//! The w3s-proxy HTTP service layer.
//!
//! [`ProxyService`] ties together request classification, the upload and
//! fetch pipelines, and the fault boundary into a single hyper-compatible
//! service. It handles:
//!
//! 1. Method-based dispatch (GET fetches, everything else uploads)
//! 2. Per-request endpoint/credential/extension resolution
//! 3. Buffered capture of the upload body into a [`w3s_proxy_core::MemFile`]
//! 4. Streaming of fetched content back to the client without buffering
//! 5. Translation of every failure — including panics — into a bounded 400

mod backend;
mod body;
mod fetch;
mod response;
mod service;
mod upload;

pub use backend::{ContentFetcher, StorageBackend};
pub use body::ProxyResponseBody;
pub use fetch::handle_fetch;
pub use response::{MAX_ERROR_BODY, error_to_response};
pub use service::{ProxyService, serve_request};
pub use upload::{FILE_STEM, handle_upload};
