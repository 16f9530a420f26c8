//! Request classification and per-request configuration resolution.
//!
//! Pure data derivation: given the method, headers, and query of one
//! request, decide whether it is an upload or a fetch and resolve the
//! effective backend endpoint, credential, and filename extension. No I/O
//! happens here and resolution never fails — malformed header values fall
//! back to the empty value and from there to the process defaults.

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};

use crate::ProxyConfig;

/// Extension used when the declared content type is absent or unmapped.
pub const FALLBACK_EXTENSION: &str = ".b";

/// Credential scheme prefix stripped from the `Authorization` header.
const BEARER_PREFIX: &str = "Bearer ";

/// Canonical extension per well-known content type.
///
/// Consulted before the `mime_guess` reverse table, which orders candidates
/// by its internal layout rather than by convention (`text/plain` would map
/// to `.conf` otherwise). First match wins; the table is the deterministic
/// tie-break for types with several viable extensions.
const CANONICAL_EXTENSIONS: &[(&str, &str)] = &[
    ("application/json", "json"),
    ("application/octet-stream", "bin"),
    ("application/pdf", "pdf"),
    ("application/wasm", "wasm"),
    ("application/xml", "xml"),
    ("image/avif", "avif"),
    ("image/gif", "gif"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/svg+xml", "svg"),
    ("image/webp", "webp"),
    ("text/css", "css"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("text/javascript", "js"),
    ("text/plain", "txt"),
    ("text/xml", "xml"),
];

/// The kind of operation a request maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Retrieve previously stored content through the read gateway.
    Fetch,
    /// Store the request body in the backend.
    Upload,
}

impl OperationKind {
    /// Classify a request by its HTTP method: GET fetches, everything else
    /// uploads.
    #[must_use]
    pub fn classify(method: &Method) -> Self {
        if *method == Method::GET {
            Self::Fetch
        } else {
            Self::Upload
        }
    }
}

/// Per-request resolved configuration.
///
/// Derived fresh for every upload from request-supplied overrides falling
/// back to the process defaults; never mutated afterwards and never shared
/// across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Effective storage backend endpoint.
    pub endpoint: String,
    /// Effective storage backend credential.
    pub token: String,
    /// Filename extension derived from the declared content type, including
    /// the leading dot.
    pub extension: String,
}

impl RequestContext {
    /// Resolve the effective configuration for one request.
    ///
    /// Priority order per field: request override, then process default.
    #[must_use]
    pub fn resolve(config: &ProxyConfig, headers: &HeaderMap, query: Option<&str>) -> Self {
        Self {
            endpoint: resolve_endpoint(query, &config.endpoint),
            token: resolve_token(headers.get(AUTHORIZATION), &config.token),
            extension: extension_for(headers.get(CONTENT_TYPE)),
        }
    }
}

/// Resolve the effective endpoint from the `host` query parameter.
fn resolve_endpoint(query: Option<&str>, default: &str) -> String {
    let host = query
        .into_iter()
        .flat_map(|q| form_urlencoded::parse(q.as_bytes()))
        .find(|(key, _)| key.as_ref() == "host")
        .map(|(_, value)| value.trim().to_owned())
        .unwrap_or_default();

    if host.is_empty() { default.to_owned() } else { host }
}

/// Resolve the effective credential from the `Authorization` header.
///
/// The value is trimmed and a leading `Bearer ` scheme is stripped; an
/// undecodable or empty value falls back to the process default.
fn resolve_token(value: Option<&HeaderValue>, default: &str) -> String {
    let token = value
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .map(|v| v.strip_prefix(BEARER_PREFIX).unwrap_or(v))
        .unwrap_or_default();

    if token.is_empty() {
        default.to_owned()
    } else {
        token.to_owned()
    }
}

/// Derive the artifact filename extension from the declared content type.
///
/// The content type's parameters are ignored (`text/plain; charset=utf-8`
/// maps like `text/plain`). Unknown or missing types map to
/// [`FALLBACK_EXTENSION`].
fn extension_for(value: Option<&HeaderValue>) -> String {
    let Some(essence) = value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<mime::Mime>().ok())
    else {
        return FALLBACK_EXTENSION.to_owned();
    };
    let essence = essence.essence_str().to_ascii_lowercase();

    let canonical = CANONICAL_EXTENSIONS
        .iter()
        .find(|(ty, _)| *ty == essence)
        .map(|(_, ext)| *ext);
    let ext = canonical.or_else(|| {
        mime_guess::get_mime_extensions_str(&essence)
            .and_then(|exts| exts.first())
            .copied()
    });

    ext.map_or_else(|| FALLBACK_EXTENSION.to_owned(), |ext| format!(".{ext}"))
}
