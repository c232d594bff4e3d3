//! File filtering logic for the scanner.

use super::MediaKind;
use std::collections::HashSet;
use std::path::Path;

/// Image extensions picked up by default
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif", "heic", "heif", "raw", "cr2",
    "cr3", "nef", "dng", "arw", "raf", "orf", "rw2",
];

/// Video extensions picked up by default
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "mkv", "wmv", "webm", "m4v", "mts", "m2ts", "3gp", "mpg", "mpeg",
];

/// Decides which files the scanner reports
#[derive(Debug, Clone)]
pub struct MediaFilter {
    /// Lowercase extensions to accept; empty accepts every file
    extensions: HashSet<String>,
    include_hidden: bool,
}

impl MediaFilter {
    /// Accept the default image and video extensions
    pub fn new() -> Self {
        Self {
            extensions: IMAGE_EXTENSIONS
                .iter()
                .chain(VIDEO_EXTENSIONS)
                .map(|e| e.to_string())
                .collect(),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Replace the accepted extensions. Matching ignores case and a leading
    /// dot; an empty list accepts every file.
    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn is_hidden(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false)
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && Self::is_hidden(path) {
            return false;
        }
        if self.extensions.is_empty() {
            return true;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }

    /// Media kind implied by the extension
    pub fn kind(path: &Path) -> MediaKind {
        path.extension()
            .and_then(|e| e.to_str())
            .map(MediaKind::from_extension)
            .unwrap_or(MediaKind::Other)
    }
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::new()
    }
}
