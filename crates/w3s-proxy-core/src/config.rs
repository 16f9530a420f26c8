//! Gateway configuration.
//!
//! All configuration is driven by environment variables and fixed at
//! startup; the resulting [`ProxyConfig`] is immutable and shared by
//! reference into every request.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Maximum accepted request body size in bytes (50 MB).
const DEFAULT_MAX_BODY_SIZE: u64 = 50_000_000;

/// Per-core multiplier for the global concurrency bound.
const CONCURRENCY_PER_CORE: usize = 128;

/// Process-wide gateway configuration.
///
/// All fields have defaults matching the original deployment. Configuration
/// can be loaded from environment variables via [`ProxyConfig::from_env`].
///
/// # Examples
///
/// ```
/// use w3s_proxy_core::ProxyConfig;
///
/// let config = ProxyConfig::default();
/// assert_eq!(config.listen, "0.0.0.0:80");
/// assert_eq!(config.endpoint, "https://api.web3.storage");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    /// Bind address for the HTTP server.
    #[builder(default = String::from("0.0.0.0:80"))]
    pub listen: String,

    /// Default storage backend endpoint, used when a request carries no
    /// `host` override.
    #[builder(default = String::from("https://api.web3.storage"))]
    pub endpoint: String,

    /// Default storage backend credential, used when a request carries no
    /// `Authorization` header.
    #[builder(default)]
    pub token: String,

    /// Base URL of the public read gateway used by fetch requests.
    #[builder(default = String::from("https://ipfs.io"))]
    pub gateway: String,

    /// Maximum request body size in bytes; larger uploads are rejected.
    #[builder(default = DEFAULT_MAX_BODY_SIZE)]
    pub max_body_size: u64,

    /// Maximum number of simultaneously served connections.
    #[builder(default = default_max_concurrency())]
    pub max_concurrency: usize,

    /// How long a connection waits for a concurrency permit before being
    /// dropped.
    #[builder(default = Duration::from_secs(2))]
    pub concurrency_backoff: Duration,

    /// Upper bound on draining one request body.
    #[builder(default = Duration::from_secs(60))]
    pub body_read_timeout: Duration,

    /// Per-chunk stall bound on streamed response bodies.
    #[builder(default = Duration::from_secs(2))]
    pub write_timeout: Duration,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `W3S_PROXY_LISTEN` | `0.0.0.0:80` |
    /// | `W3S_PROXY_ENDPOINT` | `https://api.web3.storage` |
    /// | `W3S_PROXY_TOKEN` | *(empty)* |
    /// | `W3S_PROXY_GATEWAY` | `https://ipfs.io` |
    /// | `W3S_PROXY_MAX_BODY_SIZE` | `50000000` |
    /// | `W3S_PROXY_MAX_CONCURRENCY` | *(cores × 128)* |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("W3S_PROXY_LISTEN") {
            config.listen = v;
        }
        if let Ok(v) = std::env::var("W3S_PROXY_ENDPOINT") {
            config.endpoint = v;
        }
        if let Ok(v) = std::env::var("W3S_PROXY_TOKEN") {
            config.token = v;
        }
        if let Ok(v) = std::env::var("W3S_PROXY_GATEWAY") {
            config.gateway = v;
        }
        config.max_body_size =
            parse_env_number(std::env::var("W3S_PROXY_MAX_BODY_SIZE").ok(), config.max_body_size);
        config.max_concurrency = parse_env_number(
            std::env::var("W3S_PROXY_MAX_CONCURRENCY").ok(),
            config.max_concurrency,
        );
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}

/// Concurrency bound derived from the available processing units.
fn default_max_concurrency() -> usize {
    let cores = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
    cores * CONCURRENCY_PER_CORE
}

/// Parse an optional environment value as a number, keeping the default on
/// absent, empty, or malformed input.
fn parse_env_number<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
