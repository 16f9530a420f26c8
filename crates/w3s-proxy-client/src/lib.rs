//! Outbound HTTP clients for the w3s-proxy gateway.
//!
//! Two collaborators live here: [`W3sClient`], which uploads one in-memory
//! artifact to the storage backend and returns the issued content
//! identifier, and [`GatewayFetcher`], which retrieves stored content
//! through the public read gateway as a byte stream.
//!
//! Neither client retries; a failed call fails the whole client request.
//! Cancellation is inherited from the caller — dropping an in-flight future
//! aborts the underlying request.

mod gateway;
#[cfg(test)]
mod test_support;
mod w3s;

pub use gateway::GatewayFetcher;
pub use w3s::W3sClient;
