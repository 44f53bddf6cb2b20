//! Character store
//!
//! Characters live under `<data_dir>/characters/`: a `registry.json` plus one
//! folder of reference images per slug. Folders dropped in by hand are picked
//! up by [`CharacterStore::scan`].

use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use studio_core::domain::character::{
    Character, CharacterRegistry, display_name_from_slug, fallback_slug, is_image_file,
    is_valid_slug, mime_for_file, reference_file_name, slugify,
};
use tracing::{debug, info, warn};

use super::{read_json, write_json};

pub const CHARACTERS_DIR: &str = "characters";
pub const REGISTRY_FILE: &str = "registry.json";

/// Images above this size are sent as-is but may be rejected by the API
pub const LARGE_IMAGE_BYTES: usize = 4_000_000;

/// Changes made by a folder scan
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Slugs of folders registered for the first time
    pub added: Vec<String>,
    /// Slugs whose file list changed
    pub updated: Vec<String>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty()
    }
}

/// An image file encoded as a data URI
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data_uri: String,
    /// Size of the raw file in bytes
    pub size: usize,
}

impl EncodedImage {
    pub fn is_large(&self) -> bool {
        self.size > LARGE_IMAGE_BYTES
    }
}

pub struct CharacterStore {
    dir: PathBuf,
}

impl CharacterStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join(CHARACTERS_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Folder holding the images of `slug`
    ///
    /// Fails for slugs that would resolve outside the characters directory.
    pub fn folder(&self, slug: &str) -> Result<PathBuf> {
        if !is_valid_slug(slug) {
            bail!("Invalid character slug '{}'", slug);
        }
        Ok(self.dir.join(slug))
    }

    pub fn load(&self) -> CharacterRegistry {
        read_json(&self.dir.join(REGISTRY_FILE))
    }

    pub fn save(&self, registry: &CharacterRegistry) -> Result<()> {
        write_json(&self.dir.join(REGISTRY_FILE), registry)
    }

    /// Slug for a new character named `name`
    pub fn slug_for(name: &str) -> String {
        slugify(name).unwrap_or_else(|| fallback_slug(Utc::now()))
    }

    // =============================================================================
    // Registry Operations
    // =============================================================================

    /// Scans the folder and returns every registered character
    pub fn list(&self) -> Result<Vec<Character>> {
        self.scan()?;
        Ok(self.load().characters)
    }

    pub fn get(&self, slug: &str) -> Option<Character> {
        self.load().get(slug).cloned()
    }

    /// Registers a character, replacing any entry with the same slug
    ///
    /// # Arguments
    /// * `name` - Display name
    /// * `slug` - Folder name, usually from [`CharacterStore::slug_for`]
    /// * `seed_url` - Seed image the references were generated from
    /// * `reference_urls` - Remote reference images
    /// * `local_files` - Reference images already written to the folder
    pub fn register(
        &self,
        name: &str,
        slug: &str,
        seed_url: &str,
        reference_urls: Vec<String>,
        local_files: Vec<String>,
    ) -> Result<Character> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Character name is required");
        }
        let folder = self.folder(slug)?;

        let character = Character {
            name: name.to_string(),
            slug: slug.to_string(),
            seed_url: seed_url.to_string(),
            reference_count: reference_urls.len(),
            reference_urls,
            local_files,
            created_at: Utc::now(),
            local_dir: folder.display().to_string(),
        };

        let mut registry = self.load();
        registry.upsert(character.clone());
        self.save(&registry)?;

        info!("Saved character {} ({} references)", slug, character.reference_count);
        Ok(character)
    }

    /// Removes a character and its image folder. Returns false if it was unknown.
    pub fn delete(&self, slug: &str) -> Result<bool> {
        let folder = self.folder(slug)?;
        let mut registry = self.load();
        let removed = registry.remove(slug);
        if removed {
            self.save(&registry)?;
        }

        if folder.is_dir() {
            fs::remove_dir_all(&folder)
                .with_context(|| format!("Failed to delete {}", folder.display()))?;
        }

        Ok(removed)
    }

    /// Registers hand-made folders and refreshes file lists of known characters
    pub fn scan(&self) -> Result<ScanReport> {
        let mut report = ScanReport::default();
        if !self.dir.is_dir() {
            return Ok(report);
        }

        let mut registry = self.load();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read {}", self.dir.display()))?;

        let mut folders: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_dir())
            .collect();
        folders.sort();

        for folder in folders {
            let Some(slug) = folder.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            if !is_valid_slug(&slug) || slug == "__pycache__" {
                continue;
            }

            let images = list_images(&folder)?;
            if images.is_empty() {
                continue;
            }

            match registry.characters.iter_mut().find(|c| c.slug == slug) {
                None => {
                    info!("Found new character folder {} ({} images)", slug, images.len());
                    registry.characters.push(Character {
                        name: display_name_from_slug(&slug),
                        slug: slug.clone(),
                        seed_url: String::new(),
                        reference_urls: Vec::new(),
                        reference_count: images.len(),
                        local_files: images,
                        created_at: Utc::now(),
                        local_dir: folder.display().to_string(),
                    });
                    report.added.push(slug);
                }
                Some(existing) => {
                    let mut known = existing.local_files.clone();
                    known.sort();
                    if known != images {
                        debug!(
                            "Files of {} changed: {} -> {}",
                            slug,
                            existing.local_files.len(),
                            images.len()
                        );
                        existing.reference_count = images.len().max(existing.reference_urls.len());
                        existing.local_files = images;
                        report.updated.push(slug);
                    }
                }
            }
        }

        if !report.is_empty() {
            self.save(&registry)?;
        }
        Ok(report)
    }

    // =============================================================================
    // Reference Images
    // =============================================================================

    /// Writes the n-th (zero based) downloaded reference of `slug` and returns its file name
    pub fn write_reference(
        &self,
        slug: &str,
        index: usize,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let folder = self.folder(slug)?;
        fs::create_dir_all(&folder)
            .with_context(|| format!("Failed to create {}", folder.display()))?;

        let file_name = reference_file_name(index, content_type);
        let path = folder.join(&file_name);
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(file_name)
    }

    /// Local reference images of `slug` as data URIs, at most `max`
    ///
    /// Used for characters imported by hand, which have no remote URLs.
    /// Unreadable files are skipped.
    pub fn local_references(&self, slug: &str, max: usize) -> Vec<String> {
        let Some(character) = self.get(slug) else {
            return Vec::new();
        };

        let Ok(folder) = self.folder(slug) else {
            return Vec::new();
        };
        let mut uris = Vec::new();
        for file_name in character.local_files.iter().take(max) {
            let path = folder.join(file_name);
            if !path.is_file() {
                continue;
            }
            match encode_image_file(&path) {
                Ok(image) => {
                    if image.is_large() {
                        warn!("{} is {} bytes and may be rejected", path.display(), image.size);
                    }
                    uris.push(image.data_uri);
                }
                Err(e) => warn!("Skipping {}: {:#}", path.display(), e),
            }
        }

        debug!("Encoded {} local reference(s) for {}", uris.len(), slug);
        uris
    }
}

/// Sorted image file names in `folder`
fn list_images(folder: &Path) -> Result<Vec<String>> {
    let entries =
        fs::read_dir(folder).with_context(|| format!("Failed to read {}", folder.display()))?;

    let mut images: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| is_image_file(name))
        .collect();
    images.sort();
    Ok(images)
}

/// Builds a `data:` URI
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Reads an image file into a data URI, with the MIME type taken from its extension
pub fn encode_image_file(path: &Path) -> Result<EncodedImage> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    Ok(EncodedImage {
        data_uri: data_uri(mime_for_file(name), &bytes),
        size: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"img").unwrap();
    }

    #[test]
    fn test_slug_for() {
        assert_eq!(CharacterStore::slug_for("Red Knight"), "red-knight");
        assert!(CharacterStore::slug_for("???").starts_with("char-"));
    }

    #[test]
    fn test_register_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = CharacterStore::new(dir.path());
        let urls = vec!["https://cdn/a.png".to_string(), "https://cdn/b.png".to_string()];
        let character = store
            .register("Red Knight", "red-knight", "https://cdn/seed.png", urls, vec![])
            .unwrap();

        assert_eq!(character.reference_count, 2);
        assert_eq!(store.get("red-knight"), Some(character));
        assert!(store.register("  ", "x", "", vec![], vec![]).is_err());
    }

    #[test]
    fn test_scan_registers_manual_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = CharacterStore::new(dir.path());
        touch(&store.folder("my_hero").unwrap().join("b.png"));
        touch(&store.folder("my_hero").unwrap().join("a.JPG"));
        touch(&store.folder("my_hero").unwrap().join("notes.txt"));
        touch(&store.dir().join(".hidden").join("x.png"));
        fs::create_dir_all(store.folder("empty").unwrap()).unwrap();

        let report = store.scan().unwrap();
        assert_eq!(report.added, vec!["my_hero".to_string()]);

        let character = store.get("my_hero").unwrap();
        assert_eq!(character.name, "My Hero");
        assert_eq!(character.local_files, vec!["a.JPG", "b.png"]);
        assert_eq!(character.reference_count, 2);
        assert!(character.reference_urls.is_empty());

        // nothing changed the second time
        assert!(store.scan().unwrap().is_empty());
    }

    #[test]
    fn test_scan_refreshes_known_character() {
        let dir = tempfile::tempdir().unwrap();
        let store = CharacterStore::new(dir.path());
        let urls: Vec<String> = (0..3).map(|i| format!("https://cdn/{i}.png")).collect();
        store
            .register("Hero", "hero", "", urls, vec!["ref_01.png".into()])
            .unwrap();
        touch(&store.folder("hero").unwrap().join("ref_01.png"));
        touch(&store.folder("hero").unwrap().join("ref_02.png"));

        let report = store.scan().unwrap();
        assert_eq!(report.updated, vec!["hero".to_string()]);

        let character = store.get("hero").unwrap();
        assert_eq!(character.local_files, vec!["ref_01.png", "ref_02.png"]);
        assert_eq!(character.reference_count, 3);
    }

    #[test]
    fn test_delete_removes_entry_and_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = CharacterStore::new(dir.path());
        store.register("Hero", "hero", "", vec![], vec![]).unwrap();
        touch(&store.folder("hero").unwrap().join("ref_01.png"));

        assert!(store.delete("hero").unwrap());
        assert!(store.get("hero").is_none());
        assert!(!store.folder("hero").unwrap().exists());
        assert!(!store.delete("hero").unwrap());
    }

    #[test]
    fn test_delete_rejects_paths_outside_characters_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        touch(&data.join("user_credentials.json"));
        let store = CharacterStore::new(&data);
        store.register("Hero", "hero", "", vec![], vec![]).unwrap();
        touch(&store.folder("hero").unwrap().join("ref_01.png"));

        assert!(store.delete("..").is_err());
        assert!(store.delete("a/../..").is_err());
        assert!(store.delete(".").is_err());

        assert!(data.join("user_credentials.json").is_file());
        assert!(store.folder("hero").unwrap().join("ref_01.png").is_file());
        assert!(store.get("hero").is_some());
    }

    #[test]
    fn test_folder_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = CharacterStore::new(dir.path());
        assert!(store.folder("..").is_err());
        assert!(store.folder("../secrets").is_err());
        assert!(store.write_reference("../x", 0, "image/png", b"png").is_err());
        assert!(store.local_references("..", 3).is_empty());
        assert_eq!(store.folder("hero").unwrap(), store.dir().join("hero"));
    }

    #[test]
    fn test_write_reference_names_file_from_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = CharacterStore::new(dir.path());
        let name = store.write_reference("hero", 0, "image/jpeg", b"jpg").unwrap();
        assert_eq!(name, "ref_01.jpg");
        assert_eq!(fs::read(store.folder("hero").unwrap().join(name)).unwrap(), b"jpg");
    }

    #[test]
    fn test_local_references_as_data_uris() {
        let dir = tempfile::tempdir().unwrap();
        let store = CharacterStore::new(dir.path());
        for i in 0..4 {
            touch(&store.folder("hero").unwrap().join(format!("ref_{i}.webp")));
        }
        store.scan().unwrap();

        let uris = store.local_references("hero", 3);
        assert_eq!(uris.len(), 3);
        assert_eq!(uris[0], format!("data:image/webp;base64,{}", STANDARD.encode(b"img")));
        assert!(store.local_references("nobody", 3).is_empty());
    }

    #[test]
    fn test_encode_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.jpeg");
        fs::write(&path, [0u8; 16]).unwrap();

        let image = encode_image_file(&path).unwrap();
        assert!(image.data_uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(image.size, 16);
        assert!(!image.is_large());
    }
}
