//! Remote asset retrieval.
//!
//! The resolver only sees the [`AssetFetcher`] trait, so the network can be
//! swapped for an in-memory fake in tests. [`HttpFetcher`] issues a single GET
//! with short fixed timeouts and never retries.

use std::time::Duration;

use crate::error::{QrError, QrResult};

/// Upper bound on a downloaded avatar.
pub const MAX_ASSET_BYTES: u64 = 10 * 1024 * 1024;

/// Bytes returned by a fetch together with the declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl FetchedAsset {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    /// Rejects empty bodies and declared types that cannot be an image, such as
    /// a JSON error document served with a success status.
    pub fn ensure_image(&self, url: &str) -> QrResult<()> {
        if self.bytes.is_empty() {
            return Err(QrError::remote_asset(format!("{url}: empty response body")));
        }
        let Some(content_type) = self.content_type.as_deref() else {
            return Ok(());
        };
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if mime.starts_with("image/") || mime == "application/octet-stream" || mime.is_empty() {
            return Ok(());
        }
        let preview: String = String::from_utf8_lossy(&self.bytes).chars().take(200).collect();
        Err(QrError::remote_asset(format!(
            "{url}: expected an image, got {mime}: {preview}"
        )))
    }
}

pub trait AssetFetcher {
    fn fetch(&self, url: &str) -> QrResult<FetchedAsset>;
}

/// Independent bounds on each phase of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTimeouts {
    pub connect: Duration,
    pub response: Duration,
    pub body: Duration,
}

impl Default for FetchTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(500),
            response: Duration::from_millis(500),
            body: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    timeouts: FetchTimeouts,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeouts(mut self, timeouts: FetchTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn timeouts(&self) -> FetchTimeouts {
        self.timeouts
    }

    fn agent(&self) -> ureq::Agent {
        ureq::Agent::config_builder()
            .timeout_resolve(Some(self.timeouts.connect))
            .timeout_connect(Some(self.timeouts.connect))
            .timeout_recv_response(Some(self.timeouts.response))
            .timeout_recv_body(Some(self.timeouts.body))
            .http_status_as_error(false)
            .build()
            .into()
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> QrResult<FetchedAsset> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(QrError::remote_asset(format!("{url}: not an http(s) URL")));
        }

        let mut response = self
            .agent()
            .get(url)
            .call()
            .map_err(|e| QrError::remote_asset(format!("{url}: {e}")))?;

        let status = response.status();
        if status.as_u16() >= 300 {
            return Err(QrError::remote_asset(format!("{url}: HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_ASSET_BYTES)
            .read_to_vec()
            .map_err(|e| QrError::remote_asset(format!("{url}: {e}")))?;

        tracing::debug!(url, len = bytes.len(), ?content_type, "fetched remote asset");
        Ok(FetchedAsset::new(bytes, content_type))
    }
}
