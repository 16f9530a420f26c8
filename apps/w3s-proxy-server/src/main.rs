//! w3s-proxy — HTTP gateway in front of content-addressed storage.
//!
//! Any non-GET request stores its body through the web3.storage upload API
//! and answers with `<cid>/<filename>`; GET requests stream the content
//! back through a public IPFS gateway.
//!
//! # Usage
//!
//! ```text
//! W3S_PROXY_TOKEN=eyJ... w3s-proxy
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `W3S_PROXY_LISTEN` | `0.0.0.0:80` | Bind address |
//! | `W3S_PROXY_ENDPOINT` | `https://api.web3.storage` | Default storage endpoint |
//! | `W3S_PROXY_TOKEN` | *(empty)* | Default storage credential |
//! | `W3S_PROXY_GATEWAY` | `https://ipfs.io` | Public read gateway |
//! | `W3S_PROXY_MAX_BODY_SIZE` | `50000000` | Upload size limit in bytes |
//! | `W3S_PROXY_MAX_CONCURRENCY` | *(cores × 128)* | Connection limit |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod handler;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use w3s_proxy_core::ProxyConfig;
use w3s_proxy_http::{ContentFetcher, ProxyService, StorageBackend};

use crate::handler::{IpfsFetcher, W3sBackend};

/// Server version reported in the startup log.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config
/// value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Run the accept loop, serving connections until a shutdown signal is
/// received.
///
/// Connections beyond the configured concurrency bound are held for the
/// backoff interval and dropped if no slot frees up, rather than queued
/// without bound.
async fn serve<S, F>(
    listener: TcpListener,
    service: ProxyService<S, F>,
    config: &ProxyConfig,
) -> Result<()>
where
    S: StorageBackend,
    F: ContentFetcher,
{
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());
    let limiter = Arc::new(Semaphore::new(config.max_concurrency));

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let acquire = Arc::clone(&limiter).acquire_owned();
                let permit = match tokio::time::timeout(config.concurrency_backoff, acquire).await {
                    Ok(Ok(permit)) => permit,
                    Ok(Err(_)) | Err(_) => {
                        warn!(%peer_addr, "concurrency limit reached, dropping connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                    drop(permit);
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Build the service and serve until shutdown.
async fn run(config: ProxyConfig) -> Result<()> {
    let fetcher = IpfsFetcher::new(&config)
        .map_err(|e| anyhow::anyhow!("invalid gateway configuration: {e}"))?;
    let service = ProxyService::new(Arc::new(config.clone()), W3sBackend, fetcher);

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen))?;

    // Failing to bind is the only error fatal to startup.
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        endpoint = %config.endpoint,
        gateway = %config.gateway,
        max_body_size = config.max_body_size,
        max_concurrency = config.max_concurrency,
        version = VERSION,
        "starting w3s-proxy",
    );

    serve(listener, service, &config).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ProxyConfig::from_env();
    init_tracing(&config.log_level)?;

    // Outer boundary: log any otherwise-uncaught fault before exiting.
    if let Err(e) = run(config).await {
        error!(error = %e, "fatal error, shutting down");
        return Err(e);
    }

    Ok(())
}
