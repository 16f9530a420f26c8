//! Integration tests for the w3s-proxy server.
//!
//! These tests require a running w3s-proxy at `localhost:8080` with a valid
//! backend token. They are marked `#[ignore]` so they don't run during
//! normal `cargo test`.
//!
//! Run them with:
//! ```text
//! W3S_PROXY_URL=http://localhost:8080 cargo test -p w3s-proxy-integration -- --ignored
//! ```

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Base URL of the proxy under test.
#[must_use]
pub fn proxy_url() -> String {
    std::env::var("W3S_PROXY_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned())
}

/// Create an HTTP client pointing at the proxy.
#[must_use]
pub fn client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

mod test_fetch;
mod test_upload;
