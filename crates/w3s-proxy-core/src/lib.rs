//! Core types, configuration, and request classification for the w3s-proxy
//! gateway.
//!
//! This crate provides the building blocks shared by the HTTP layer and the
//! outbound clients: the process-wide [`ProxyConfig`], the shared
//! [`ProxyError`] type, the [`Cid`] content identifier, the [`MemFile`]
//! in-memory upload artifact, and the per-request [`RequestContext`]
//! derivation.

mod config;
mod context;
mod error;
mod memfile;
mod types;

pub use config::ProxyConfig;
pub use context::{FALLBACK_EXTENSION, OperationKind, RequestContext};
pub use error::{ProxyError, ProxyResult};
pub use memfile::{MemFile, MemFileStat};
pub use types::{ByteStream, Cid, FetchedContent};
