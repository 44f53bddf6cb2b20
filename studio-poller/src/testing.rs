//! Scripted fetchers for poller tests

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use studio_core::domain::job::{JobId, StatusReport};

use crate::fetcher::{DownloadFetcher, StatusFetcher};

type StatusScript = Box<dyn Fn(&str, usize) -> Result<StatusReport> + Send + Sync>;
type DownloadScript = Box<dyn Fn(&str) -> Result<Option<String>> + Send + Sync>;

/// Answers status queries from a closure of (job id, nth query of that id)
pub struct ScriptedFetcher {
    status: StatusScript,
    download: DownloadScript,
    status_log: Mutex<Vec<String>>,
    download_log: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new<F>(status: F) -> Self
    where
        F: Fn(&str, usize) -> Result<StatusReport> + Send + Sync + 'static,
    {
        Self {
            status: Box::new(status),
            download: Box::new(|id| Ok(Some(url_for(id)))),
            status_log: Mutex::new(Vec::new()),
            download_log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_download<F>(mut self, download: F) -> Self
    where
        F: Fn(&str) -> Result<Option<String>> + Send + Sync + 'static,
    {
        self.download = Box::new(download);
        self
    }

    pub fn status_log(&self) -> Vec<String> {
        self.status_log.lock().unwrap().clone()
    }

    pub fn status_calls(&self, id: &str) -> usize {
        self.status_log.lock().unwrap().iter().filter(|x| *x == id).count()
    }

    pub fn download_calls(&self, id: &str) -> usize {
        self.download_log.lock().unwrap().iter().filter(|x| *x == id).count()
    }
}

#[async_trait]
impl StatusFetcher for ScriptedFetcher {
    async fn fetch_status(&self, job_id: &JobId) -> Result<StatusReport> {
        let nth = {
            let mut log = self.status_log.lock().unwrap();
            let nth = log.iter().filter(|x| *x == job_id.as_str()).count();
            log.push(job_id.to_string());
            nth
        };
        (self.status)(job_id.as_str(), nth)
    }
}

#[async_trait]
impl DownloadFetcher for ScriptedFetcher {
    async fn fetch_download_url(&self, job_id: &JobId) -> Result<Option<String>> {
        self.download_log.lock().unwrap().push(job_id.to_string());
        (self.download)(job_id.as_str())
    }
}

pub fn url_for(id: &str) -> String {
    format!("https://cdn.example.test/{id}.png")
}

pub fn ids(raw: &[&str]) -> Vec<JobId> {
    raw.iter().map(|s| JobId::from(*s)).collect()
}
