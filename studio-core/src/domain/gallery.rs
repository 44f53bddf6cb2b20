//! Gallery of generated images
//!
//! History of resolved image URLs, most recent first, keyed by generation ID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of items kept in the gallery
pub const GALLERY_CAPACITY: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    pub url: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gallery {
    items: Vec<GalleryItem>,
}

impl Gallery {
    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds an item at the front. Returns false if the ID is already present.
    pub fn add(&mut self, id: impl Into<String>, url: impl Into<String>, date: DateTime<Utc>) -> bool {
        let id = id.into();
        if self.items.iter().any(|item| item.id == id) {
            return false;
        }

        self.items.insert(
            0,
            GalleryItem {
                id,
                url: url.into(),
                date,
            },
        );
        self.items.truncate(GALLERY_CAPACITY);
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_most_recent_first() {
        let mut gallery = Gallery::default();
        gallery.add("a", "url-a", Utc::now());
        gallery.add("b", "url-b", Utc::now());
        assert_eq!(gallery.items()[0].id, "b");
        assert_eq!(gallery.items()[1].id, "a");
    }

    #[test]
    fn test_add_skips_duplicates() {
        let mut gallery = Gallery::default();
        assert!(gallery.add("a", "url-a", Utc::now()));
        assert!(!gallery.add("a", "url-other", Utc::now()));
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.items()[0].url, "url-a");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut gallery = Gallery::default();
        for i in 0..(GALLERY_CAPACITY + 5) {
            gallery.add(format!("g{i}"), "u", Utc::now());
        }
        assert_eq!(gallery.len(), GALLERY_CAPACITY);
        assert_eq!(gallery.items()[0].id, format!("g{}", GALLERY_CAPACITY + 4));
        assert!(gallery.items().iter().all(|item| item.id != "g0"));
    }
}
