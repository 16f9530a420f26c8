//! Adapters wiring the outbound clients into the HTTP layer's capability
//! traits.

use async_trait::async_trait;

use w3s_proxy_client::{GatewayFetcher, W3sClient};
use w3s_proxy_core::{Cid, FetchedContent, MemFile, ProxyConfig, ProxyResult, RequestContext};
use w3s_proxy_http::{ContentFetcher, StorageBackend};

/// Storage backend backed by the web3.storage upload API.
///
/// Stateless: a fresh [`W3sClient`] is constructed for every upload because
/// the endpoint and credential are request-scoped.
#[derive(Debug, Clone, Copy, Default)]
pub struct W3sBackend;

#[async_trait]
impl StorageBackend for W3sBackend {
    async fn put(&self, ctx: &RequestContext, file: &mut MemFile) -> ProxyResult<Cid> {
        let client = W3sClient::new(&ctx.endpoint, &ctx.token)?;
        client.put(file).await
    }
}

/// Content fetcher backed by a public IPFS gateway.
#[derive(Debug, Clone)]
pub struct IpfsFetcher {
    inner: GatewayFetcher,
}

impl IpfsFetcher {
    /// Create the fetcher for the configured gateway.
    pub fn new(config: &ProxyConfig) -> ProxyResult<Self> {
        Ok(Self {
            inner: GatewayFetcher::new(&config.gateway, config.write_timeout)?,
        })
    }
}

#[async_trait]
impl ContentFetcher for IpfsFetcher {
    async fn fetch(&self, path: &str) -> ProxyResult<FetchedContent> {
        self.inner.fetch(path).await
    }
}
