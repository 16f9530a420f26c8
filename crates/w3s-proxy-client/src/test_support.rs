//! Test helpers: a one-shot canned HTTP server on an ephemeral port.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// The request captured by [`serve_once`].
pub struct RecordedRequest {
    /// Request line and headers, without the terminating blank line.
    pub head: String,
    /// Request body bytes.
    pub body: Vec<u8>,
}

/// Serve exactly one connection, answering with the given raw response, and
/// return the base URL plus a handle resolving to the captured request.
pub async fn serve_once(response: &'static str) -> (String, JoinHandle<RecordedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        // Read the request head, then exactly Content-Length body bytes.
        let (head_end, content_length) = loop {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before sending a full request head");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = find_head_end(&raw) {
                let head = String::from_utf8_lossy(&raw[..pos]).into_owned();
                break (pos, parse_content_length(&head));
            }
        };
        while raw.len() < head_end + 4 + content_length {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before sending the full body");
            raw.extend_from_slice(&buf[..n]);
        }

        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();

        RecordedRequest {
            head: String::from_utf8_lossy(&raw[..head_end]).into_owned(),
            body: raw[head_end + 4..head_end + 4 + content_length].to_vec(),
        }
    });

    (format!("http://{addr}"), handle)
}

/// Byte offset of the `\r\n\r\n` separating head from body, if present.
fn find_head_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}

/// The declared Content-Length, or zero when absent.
fn parse_content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
        .unwrap_or(0)
}
