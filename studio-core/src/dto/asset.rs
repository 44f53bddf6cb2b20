//! Asset status and download DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobStatus, StatusReport};

/// Raw status of one generation as reported by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetStatus {
    #[serde(default)]
    pub generation_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub download_available: Option<bool>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AssetStatus {
    /// Normalizes the reported status; a missing status counts as pending
    pub fn report(&self) -> StatusReport {
        let status = JobStatus::normalize(self.status.as_deref().unwrap_or("pending"));
        let error_message = match status {
            JobStatus::Failed => self.error_message.clone().or_else(|| self.error.clone()),
            _ => None,
        };
        StatusReport {
            status,
            error_message,
        }
    }
}

/// Download information of a finished generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadInfo {
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl DownloadInfo {
    /// The download URL, if one was returned and is not blank
    pub fn url(&self) -> Option<&str> {
        self.download_url
            .as_deref()
            .or(self.url.as_deref())
            .filter(|u| !u.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Envelope;

    #[test]
    fn test_status_report_from_wrapped_body() {
        let body = r#"{"data":{"generation_id":"g1","status":"succeeded","download_available":true}}"#;
        let status: Envelope<AssetStatus> = serde_json::from_str(body).unwrap();
        assert_eq!(status.into_inner().report().status, JobStatus::Completed);
    }

    #[test]
    fn test_failed_status_carries_error() {
        let status: AssetStatus =
            serde_json::from_str(r#"{"status":"error","error":"nsfw filter"}"#).unwrap();
        let report = status.report();
        assert_eq!(report.status, JobStatus::Failed);
        assert_eq!(report.error_message.as_deref(), Some("nsfw filter"));
    }

    #[test]
    fn test_missing_status_is_pending() {
        let status: AssetStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(status.report().status, JobStatus::Pending);
    }

    #[test]
    fn test_download_url_synonyms() {
        let a: DownloadInfo = serde_json::from_str(r#"{"download_url":"https://a"}"#).unwrap();
        let b: DownloadInfo = serde_json::from_str(r#"{"url":"https://b"}"#).unwrap();
        let c: DownloadInfo = serde_json::from_str(r#"{"download_url":""}"#).unwrap();
        assert_eq!(a.url(), Some("https://a"));
        assert_eq!(b.url(), Some("https://b"));
        assert_eq!(c.url(), None);
    }
}
