//! Error to HTTP response mapping.
//!
//! Every failure — input error, backend error, or caught fault — becomes a
//! status 400 response whose body is the error message truncated to
//! [`MAX_ERROR_BODY`] bytes. Nothing beyond the truncated message is ever
//! exposed: no stack traces, no internal identifiers.

use w3s_proxy_core::ProxyError;

use crate::body::ProxyResponseBody;

/// Maximum length of an error response body, in bytes.
pub const MAX_ERROR_BODY: usize = 200;

/// Convert an error into the uniform bounded 400 response.
#[must_use]
pub fn error_to_response(err: &ProxyError) -> http::Response<ProxyResponseBody> {
    let message = truncate_message(&err.to_string(), MAX_ERROR_BODY);
    http::Response::builder()
        .status(http::StatusCode::BAD_REQUEST)
        .body(ProxyResponseBody::from_string(message))
        .expect("error response should be valid")
}

/// Truncate a message to at most `limit` bytes, on a char boundary.
fn truncate_message(message: &str, limit: usize) -> String {
    if message.len() <= limit {
        return message.to_owned();
    }
    let mut end = limit;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message[..end].to_owned()
}
