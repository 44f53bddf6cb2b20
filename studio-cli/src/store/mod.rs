//! Local stores
//!
//! JSON files kept under the data directory: saved credentials, the
//! character registry with its image folders, and the gallery history.

pub mod characters;
pub mod credentials;
pub mod gallery;

pub use characters::CharacterStore;
pub use credentials::CredentialStore;
pub use gallery::GalleryStore;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Reads a JSON file, falling back to the default when it is missing or corrupt
pub(crate) fn read_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return T::default(),
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring unreadable {}: {}", path.display(), e);
            T::default()
        }
    }
}

/// Writes pretty-printed JSON, creating parent directories as needed
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
