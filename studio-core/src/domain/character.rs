//! Character domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image file extensions recognised in a character folder
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// A character created from a turnaround batch or imported from a folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub seed_url: String,
    #[serde(default)]
    pub reference_urls: Vec<String>,
    #[serde(default)]
    pub local_files: Vec<String>,
    #[serde(default)]
    pub reference_count: usize,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub local_dir: String,
}

impl Character {
    pub fn has_references(&self) -> bool {
        !self.reference_urls.is_empty() || !self.local_files.is_empty()
    }
}

/// On-disk registry of characters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterRegistry {
    #[serde(default)]
    pub characters: Vec<Character>,
}

impl CharacterRegistry {
    pub fn get(&self, slug: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.slug == slug)
    }

    /// Inserts a character, replacing any entry with the same slug
    pub fn upsert(&mut self, character: Character) {
        self.characters.retain(|c| c.slug != character.slug);
        self.characters.push(character);
    }

    /// Removes a character. Returns true if an entry was removed.
    pub fn remove(&mut self, slug: &str) -> bool {
        let before = self.characters.len();
        self.characters.retain(|c| c.slug != slug);
        before != self.characters.len()
    }
}

/// Builds the folder slug for a character name
///
/// Lowercases, turns spaces and underscores into dashes and drops everything
/// outside `[a-z0-9-]`. Returns `None` when nothing survives.
pub fn slugify(name: &str) -> Option<String> {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    if slug.is_empty() { None } else { Some(slug) }
}

/// Whether `slug` names a single folder directly inside the characters directory
///
/// Accepts generated slugs and folder names added by hand (letters, digits,
/// `-`, `_`, `.` and spaces) but never a path separator or a leading dot, so
/// `.`, `..` and hidden folders are rejected.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' '))
}

/// Slug used when a name produces no usable characters
pub fn fallback_slug(now: DateTime<Utc>) -> String {
    format!("char-{}", now.timestamp())
}

/// Display name for a folder imported by hand ("my_hero-2" -> "My Hero 2")
pub fn display_name_from_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a file name has an image extension
pub fn is_image_file(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// MIME type for an image file name, defaulting to PNG
pub fn mime_for_file(name: &str) -> &'static str {
    let ext = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "image/png",
    }
}

/// File extension for a downloaded image, from its content type
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    if content_type.contains("jpeg") || content_type.contains("jpg") {
        ".jpg"
    } else if content_type.contains("webp") {
        ".webp"
    } else {
        ".png"
    }
}

/// File name of the n-th (zero based) downloaded reference image
pub fn reference_file_name(index: usize, content_type: &str) -> String {
    format!("ref_{:02}{}", index + 1, extension_for_content_type(content_type))
}
