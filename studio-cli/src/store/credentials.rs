//! Credential store
//!
//! Keeps the client id, secret and last access token in
//! `<data_dir>/user_credentials.json`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use studio_core::domain::account::Credentials;

use super::{read_json, write_json};

pub const CREDENTIALS_FILE: &str = "user_credentials.json";

pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CREDENTIALS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads saved credentials; a missing or corrupt file yields empty credentials
    pub fn load(&self) -> Credentials {
        read_json(&self.path)
    }

    /// Merges `update` into the saved credentials and writes the result
    pub fn save(&self, update: Credentials) -> Result<Credentials> {
        let mut credentials = self.load();
        credentials.merge(update);
        write_json(&self.path, &credentials)?;
        Ok(credentials)
    }

    /// Deletes the credentials file. Returns false if there was nothing to delete.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to delete {}", self.path.display()))?;
        Ok(true)
    }
}

/// Credentials view that never shows the secret or token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedCredentials {
    pub client_id: String,
    pub has_secret: bool,
    pub has_token: bool,
}

impl From<&Credentials> for MaskedCredentials {
    fn from(credentials: &Credentials) -> Self {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        Self {
            client_id: credentials.client_id.clone().unwrap_or_default(),
            has_secret: present(&credentials.client_secret),
            has_token: present(&credentials.access_token),
        }
    }
}
