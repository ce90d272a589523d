//! Media attachment gateway
//!
//! Uploads and deletes binary image assets on the third-party asset host.
//! An upload yields a [`Picture`]: the host-assigned `public_id` used later
//! for deletion plus a stable public URL.

use async_trait::async_trait;
use serde::Deserialize;

use roomer_core::{MediaConfig, Picture, RoomerError, Result};

/// Gateway to the external binary-asset host.
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Upload raw image bytes; returns the stored asset reference.
    async fn upload(&self, bytes: Vec<u8>) -> Result<Picture>;

    /// Delete an asset by its host-assigned id.
    async fn remove(&self, public_id: &str) -> Result<()>;
}

/// HTTP implementation against the configured asset host.
pub struct HttpMediaGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpMediaGateway {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

/// Upload response from the asset host
#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[async_trait]
impl MediaGateway for HttpMediaGateway {
    async fn upload(&self, bytes: Vec<u8>) -> Result<Picture> {
        let response = self
            .client
            .post(format!("{}/image/upload", self.base_url))
            .bearer_auth(&self.api_key)
            .body(bytes)
            .send()
            .await
            .map_err(|e| RoomerError::Upstream(format!("Media host upload failed: {e}")))?
            .error_for_status()
            .map_err(|e| RoomerError::Upstream(format!("Media host upload failed: {e}")))?;

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| RoomerError::Upstream(format!("Media host returned invalid body: {e}")))?;

        Ok(Picture {
            public_id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }

    async fn remove(&self, public_id: &str) -> Result<()> {
        self.client
            .delete(format!("{}/image/{}", self.base_url, public_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| RoomerError::Upstream(format!("Media host deletion failed: {e}")))?
            .error_for_status()
            .map_err(|e| RoomerError::Upstream(format!("Media host deletion failed: {e}")))?;

        Ok(())
    }
}

/// Recording fake for tests: uploads mint sequential assets, removals are
/// captured for assertions.
#[cfg(any(test, feature = "test-utils"))]
pub struct RecordingMediaGateway {
    uploads: std::sync::atomic::AtomicU64,
    removed: std::sync::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingMediaGateway {
    pub fn new() -> Self {
        Self {
            uploads: std::sync::atomic::AtomicU64::new(0),
            removed: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Ids passed to `remove`, in call order.
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> u64 {
        self.uploads.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for RecordingMediaGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl MediaGateway for RecordingMediaGateway {
    async fn upload(&self, _bytes: Vec<u8>) -> Result<Picture> {
        let n = self
            .uploads
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(Picture {
            public_id: format!("asset-{n}"),
            url: format!("https://media.test/asset-{n}"),
        })
    }

    async fn remove(&self, public_id: &str) -> Result<()> {
        self.removed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}
