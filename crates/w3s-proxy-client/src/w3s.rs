//! Storage client for the backend's upload endpoint.

use std::io::{Read, Seek, SeekFrom};

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use w3s_proxy_core::{Cid, MemFile, ProxyError, ProxyResult};

/// Client name reported to the backend in the `X-Client` header.
const CLIENT_NAME: &str = "w3s-proxy";

/// Client for the storage backend's upload API.
///
/// One instance is constructed per upload request, bound to that request's
/// resolved endpoint and credential; nothing is pooled or cached across
/// requests.
#[derive(Debug, Clone)]
pub struct W3sClient {
    http: reqwest::Client,
    endpoint: Url,
    token: String,
}

/// Body of a successful upload response.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    cid: String,
}

impl W3sClient {
    /// Create a client bound to the given endpoint and credential.
    ///
    /// # Errors
    /// Returns [`ProxyError::InvalidEndpoint`] if the endpoint is not a
    /// parseable absolute URL.
    pub fn new(endpoint: &str, token: &str) -> ProxyResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| ProxyError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ProxyError::Backend(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            token: token.to_owned(),
        })
    }

    /// Upload the artifact and return the backend-issued content identifier.
    ///
    /// The file is rewound and read in full; the caller retains ownership
    /// and is responsible for releasing it. No timeout is applied beyond the
    /// caller's cancellation.
    pub async fn put(&self, file: &mut MemFile) -> ProxyResult<Cid> {
        let stat = file.stat();
        file.seek(SeekFrom::Start(0))
            .map_err(|e| ProxyError::Backend(e.to_string()))?;
        let mut data = Vec::with_capacity(usize::try_from(stat.size).unwrap_or(0));
        file.read_to_end(&mut data)
            .map_err(|e| ProxyError::Backend(e.to_string()))?;

        let url = format!("{}/upload", self.endpoint.as_str().trim_end_matches('/'));
        debug!(%url, name = %stat.name, size = stat.size, "uploading artifact");

        let response = self
            .http
            .post(&url)
            .header(http::header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header("X-Client", CLIENT_NAME)
            .header("X-Name", stat.name)
            .body(data)
            .send()
            .await
            .map_err(|e| ProxyError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProxyError::BackendStatus {
                status: status.as_u16(),
                message,
            });
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| ProxyError::Backend(e.to_string()))?;
        Cid::new(upload.cid)
    }
}
