//! Gallery store

use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use studio_core::domain::gallery::Gallery;

use super::{read_json, write_json};

pub const GALLERY_FILE: &str = "gallery.json";

/// History of generated images in `<data_dir>/gallery.json`
pub struct GalleryStore {
    path: PathBuf,
}

impl GalleryStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(GALLERY_FILE),
        }
    }

    pub fn load(&self) -> Gallery {
        read_json(&self.path)
    }

    /// Records a generated image. Returns false if the ID was already recorded.
    pub fn add(&self, id: &str, url: &str) -> Result<bool> {
        let mut gallery = self.load();
        if !gallery.add(id, url, Utc::now()) {
            return Ok(false);
        }
        write_json(&self.path, &gallery)?;
        Ok(true)
    }

    pub fn clear(&self) -> Result<()> {
        write_json(&self.path, &Gallery::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_persists_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = GalleryStore::new(dir.path());
        assert!(store.add("g1", "https://cdn/1.png").unwrap());
        assert!(store.add("g2", "https://cdn/2.png").unwrap());
        assert!(!store.add("g1", "https://cdn/other.png").unwrap());

        let gallery = store.load();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.items()[0].id, "g2");
        assert_eq!(gallery.items()[1].url, "https://cdn/1.png");
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = GalleryStore::new(dir.path());
        store.add("g1", "u").unwrap();
        store.clear().unwrap();
        assert!(store.load().is_empty());
    }
}
