//! Asset status and download endpoints

use crate::error::{ClientError, Result};
use crate::{ASSET_TIMEOUT, IMAGE_TIMEOUT, StudioClient};
use studio_core::domain::job::JobId;
use studio_core::dto::asset::{AssetStatus, DownloadInfo};
use tracing::debug;

/// A downloaded image
#[derive(Debug, Clone)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl StudioClient {
    /// Get the raw status of a generation
    pub async fn asset_status(&self, job_id: &JobId) -> Result<AssetStatus> {
        let url = self.url(&format!("/api/v1/asset/status/{}", job_id));
        let status: AssetStatus = self
            .authed_json(|c| c.get(&url).timeout(ASSET_TIMEOUT))
            .await?;

        debug!(
            "[STATUS] {}... -> {}",
            job_id.short(),
            status.status.as_deref().unwrap_or("?")
        );
        Ok(status)
    }

    /// Get the download information of a finished generation
    ///
    /// Returns [`ClientError::NotReady`] while the asset is still being produced.
    pub async fn asset_download(&self, job_id: &JobId) -> Result<DownloadInfo> {
        let url = self.url(&format!("/api/v1/asset/download/{}", job_id));
        let info: DownloadInfo = self
            .authed_json(|c| c.get(&url).timeout(ASSET_TIMEOUT))
            .await?;

        debug!("[DOWNLOAD] {}... -> {:?}", job_id.short(), info.url());
        Ok(info)
    }

    /// Download an image from an absolute URL
    ///
    /// Asset URLs are pre-signed, so no credentials are sent.
    pub async fn fetch_image(&self, url: &str) -> Result<ImageData> {
        let response = self.client.get(url).timeout(IMAGE_TIMEOUT).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::from_status(
                status.as_u16(),
                format!("image download failed: {}", url),
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(ImageData {
            bytes,
            content_type,
        })
    }
}
