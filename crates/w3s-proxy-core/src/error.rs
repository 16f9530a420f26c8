//! Error types shared across the w3s-proxy crates.
//!
//! [`ProxyError`] is the single error currency of the gateway: every pipeline
//! step returns it, and the HTTP layer maps any value to a bounded 400
//! response. Variants distinguish input errors (body), backend errors
//! (storage client and content gateway), and runtime faults caught at the
//! service boundary.

/// Gateway error type.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The request body could not be read or buffered.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// The request body exceeded the configured size limit.
    #[error("request body exceeds the {limit} byte limit")]
    BodyTooLarge {
        /// The enforced limit in bytes.
        limit: u64,
    },

    /// Draining the request body did not complete within the read timeout.
    #[error("timed out reading request body after {seconds}s")]
    BodyTimeout {
        /// The timeout that elapsed, in seconds.
        seconds: u64,
    },

    /// The resolved backend endpoint could not be parsed as a URL.
    #[error("invalid backend endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        /// The endpoint value that failed to parse.
        endpoint: String,
        /// The parser's reason.
        reason: String,
    },

    /// The storage backend could not be reached or the call failed in
    /// transit.
    #[error("storage backend request failed: {0}")]
    Backend(String),

    /// The storage backend answered with a non-success status.
    #[error("storage backend returned status {status}: {message}")]
    BackendStatus {
        /// The HTTP status code reported by the backend.
        status: u16,
        /// The backend's error message.
        message: String,
    },

    /// The storage backend accepted the upload but returned no usable
    /// content identifier.
    #[error("storage backend returned an empty content identifier")]
    EmptyCid,

    /// The content gateway could not be reached or the stream failed.
    #[error("content fetch failed: {0}")]
    Gateway(String),

    /// The content gateway answered with a non-success status.
    #[error("content gateway returned status {status}")]
    GatewayStatus {
        /// The HTTP status code reported by the gateway.
        status: u16,
    },

    /// A runtime fault (panic) caught at the request boundary.
    #[error("unexpected fault: {0}")]
    Fault(String),

    /// Internal error that does not fit the categories above.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience result type for gateway operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_render_body_limit_in_message() {
        let err = ProxyError::BodyTooLarge { limit: 50_000_000 };
        assert_eq!(
            err.to_string(),
            "request body exceeds the 50000000 byte limit"
        );
    }

    #[test]
    fn test_should_render_backend_status_message() {
        let err = ProxyError::BackendStatus {
            status: 401,
            message: "invalid token".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "storage backend returned status 401: invalid token"
        );
    }

    #[test]
    fn test_should_render_endpoint_in_message() {
        let err = ProxyError::InvalidEndpoint {
            endpoint: "not a url".to_owned(),
            reason: "relative URL without a base".to_owned(),
        };
        assert!(err.to_string().contains("not a url"));
    }
}
